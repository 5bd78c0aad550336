//! Documentation comments of removed declarations.
//!
//! Comments hang off source positions, so they cannot follow a field into the
//! synthesized object. They are read as plain lines here and written back as a
//! fresh block comment in front of the generated entry.

use once_cell::sync::Lazy;
use regex::Regex;
use swc_common::comments::{Comment, CommentKind};

/// Indentation and the `*` gutter of a block comment line.
static GUTTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\*?[ \t]?").expect("gutter pattern"));

/// Content lines of `comments`, in order, without comment markers.
pub fn doc_lines(comments: &[Comment]) -> Vec<String> {
    let mut lines = Vec::new();

    for comment in comments {
        match comment.kind {
            CommentKind::Line => lines.push(comment.text.trim().to_string()),
            CommentKind::Block => {
                let text = comment.text.strip_prefix('*').unwrap_or(&*comment.text);
                for line in text.lines() {
                    lines.push(GUTTER.replace(line, "").trim_end().to_string());
                }
            }
        }
    }

    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines.drain(end..);
    lines.drain(..start);
    lines
}

/// Block comment for `lines`, every line prefixed with `indent`.
pub fn render(lines: &[String], indent: &str, new_line: &str) -> Option<String> {
    match lines {
        [] => None,
        [line] => Some(format!("{indent}/** {line} */")),
        _ => {
            let mut out = format!("{indent}/**");
            for line in lines {
                out.push_str(new_line);
                out.push_str(indent);
                if line.is_empty() {
                    out.push_str(" *");
                } else {
                    out.push_str(" * ");
                    out.push_str(line);
                }
            }
            out.push_str(new_line);
            out.push_str(indent);
            out.push_str(" */");
            Some(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use swc_common::DUMMY_SP;

    use super::*;

    fn block(text: &str) -> Comment {
        Comment {
            kind: CommentKind::Block,
            span: DUMMY_SP,
            text: text.into(),
        }
    }

    fn line(text: &str) -> Comment {
        Comment {
            kind: CommentKind::Line,
            span: DUMMY_SP,
            text: text.into(),
        }
    }

    #[test]
    fn single_line_jsdoc() {
        assert_eq!(doc_lines(&[block("* The label ")]), vec!["The label"]);
    }

    #[test]
    fn multi_line_jsdoc_loses_its_gutter() {
        let lines = doc_lines(&[block("*\n     * First line.\n     *\n     * Third line.\n     ")]);
        assert_eq!(lines, vec!["First line.", "", "Third line."]);
    }

    #[test]
    fn line_comments_are_kept() {
        let lines = doc_lines(&[line(" counts clicks"), block(" plain block ")]);
        assert_eq!(lines, vec!["counts clicks", "plain block"]);
    }

    #[test]
    fn render_single_line() {
        let lines = vec!["Shown on the button.".to_string()];
        assert_eq!(
            render(&lines, "    ", "\n").as_deref(),
            Some("    /** Shown on the button. */")
        );
        assert_eq!(render(&[], "", "\n"), None);
    }

    #[test]
    fn render_multi_line() {
        let lines = vec!["First.".to_string(), String::new(), "Third.".to_string()];
        let rendered = render(&lines, "", "\n").unwrap();

        insta::assert_snapshot!(rendered, @r"
          /**
           * First.
           *
           * Third.
           */
        ");
    }
}
