//! Final reformat of a transformed document.
//!
//! Items that came from the input are printed as written, together with their
//! comments and the blank lines between them. Synthesized items already follow
//! the configured layout. Quotes and newlines are then normalized over the
//! whole file.

use serde::{Deserialize, Serialize};
use swc_common::comments::{Comment, CommentKind};
use swc_common::{BytePos, Span};
use swc_ecma_ast::{ModuleItem, Str};
use swc_ecma_visit::{Visit, VisitWith};

use crate::document::{full_span, Document};
use crate::error::{Error, Result};

const SPACES: &str = "                ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indent {
    /// Between 1 and 16 spaces per level.
    Spaces(u8),
    Tab,
}

impl Indent {
    pub fn as_str(self) -> &'static str {
        match self {
            Indent::Tab => "\t",
            Indent::Spaces(width) => &SPACES[..usize::from(width.clamp(1, 16))],
        }
    }

    /// Columns taken by one level, a tab counting as two.
    pub fn width(self) -> usize {
        match self {
            Indent::Tab => 2,
            Indent::Spaces(width) => usize::from(width.clamp(1, 16)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewLine {
    Lf,
    CrLf,
}

impl NewLine {
    pub fn as_str(self) -> &'static str {
        match self {
            NewLine::Lf => "\n",
            NewLine::CrLf => "\r\n",
        }
    }
}

/// Style of the transformed file.
///
/// Indentation, trailing commas and brace padding shape the synthesized code.
/// Quotes and newlines apply to the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatConfig {
    pub indent: Indent,
    pub quote: QuoteStyle,
    pub new_line: NewLine,
    pub trailing_commas: bool,
    pub bracket_spacing: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: Indent::Spaces(2),
            quote: QuoteStyle::Single,
            new_line: NewLine::Lf,
            trailing_commas: false,
            bracket_spacing: true,
        }
    }
}

impl FormatConfig {
    /// Rejects settings the printer cannot honour.
    pub fn validate(&self) -> Result<()> {
        if let Indent::Spaces(width) = self.indent {
            if !(1..=16).contains(&width) {
                return Err(Error::UnsupportedFormat("indent width must be between 1 and 16"));
            }
        }
        Ok(())
    }

    /// Indentation for `depth` nesting levels.
    pub fn indent_at(&self, depth: usize) -> String {
        self.indent.as_str().repeat(depth)
    }

    /// `value` as a string literal in the configured quote style.
    pub fn string_literal(&self, value: &str) -> String {
        let quote = self.quote.as_char();
        let mut out = String::with_capacity(value.len() + 2);
        out.push(quote);
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(quote);
        out
    }
}

/// Spans and raw text of every string literal, in source order.
#[derive(Default)]
struct StrLiterals(Vec<(Span, String)>);

impl Visit for StrLiterals {
    fn visit_str(&mut self, node: &Str) {
        if let Some(raw) = &node.raw {
            self.0.push((node.span, raw.to_string()));
        }
    }
}

/// Converts a quoted literal to use `quote`, re-escaping only what the switch requires.
pub(crate) fn requote(raw: &str, quote: char) -> String {
    let Some(open) = raw.chars().next() else {
        return raw.to_string();
    };
    if open == quote || !matches!(open, '\'' | '"') || raw.len() < 2 || !raw.ends_with(open) {
        return raw.to_string();
    }

    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(raw.len() + 2);
    out.push(quote);

    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                // The old quote no longer needs escaping.
                Some(escaped) if escaped == open => out.push(escaped),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }

    out.push(quote);
    out
}

fn comment_text(comment: &Comment) -> String {
    match comment.kind {
        CommentKind::Line => format!("//{}", comment.text),
        CommentKind::Block => format!("/*{}*/", comment.text),
    }
}

fn is_import(item: &ModuleItem) -> bool {
    item.as_module_decl().is_some_and(|decl| decl.is_import())
}

/// Writes `comments` one per line, keeping blank lines the input had after them.
fn push_comments(doc: &Document, out: &mut String, comments: &[Comment], next: BytePos) {
    for (index, comment) in comments.iter().enumerate() {
        out.push_str(&comment_text(comment));
        out.push('\n');
        let following = comments.get(index + 1).map_or(next, |c| c.span.lo);
        if doc.blank_line_between(comment.span.hi, following) {
            out.push('\n');
        }
    }
}

/// The module as text, with `\n` line ends and quotes as written.
fn layout(doc: &Document) -> Result<String> {
    let mut out = String::new();
    if let Some(shebang) = &doc.module.shebang {
        out.push_str("#!");
        out.push_str(shebang);
        out.push('\n');
    }

    let mut prev: Option<(&ModuleItem, BytePos)> = None;
    for item in &doc.module.body {
        let span = full_span(item);
        let leading = doc.leading_comments(span.lo);

        if let Some((prev_item, prev_end)) = prev {
            out.push('\n');
            let first = leading.first().map_or(span.lo, |c| c.span.lo);
            let blank = if doc.is_original(prev_end) && doc.is_original(first) {
                doc.blank_line_between(prev_end, first)
            } else {
                !(is_import(prev_item) && is_import(item))
            };
            if blank {
                out.push('\n');
            }
        }

        push_comments(doc, &mut out, &leading, span.lo);
        out.push_str(&doc.snippet(span)?);

        // Comments after the last item trail it, even on later lines.
        let mut end = span.hi;
        for comment in doc.trailing_comments(span.hi) {
            if doc.is_original(end) && doc.line_of(comment.span.lo) == doc.line_of(end) {
                out.push(' ');
            } else {
                out.push('\n');
                if doc.blank_line_between(end, comment.span.lo) {
                    out.push('\n');
                }
            }
            out.push_str(&comment_text(&comment));
            end = comment.span.hi;
        }
        prev = Some((item, end));
    }

    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Rewrites the quotes of every string literal in `text`.
fn requote_all(doc: &Document, text: &str, quote: char) -> Result<String> {
    let printed = Document::parse(&format!("{}#printed", doc.name()), text)?;
    let mut literals = StrLiterals::default();
    printed.module.visit_with(&mut literals);
    literals.0.sort_by_key(|(span, _)| span.lo);

    let mut out = text.to_string();
    for (span, raw) in literals.0.into_iter().rev() {
        let requoted = requote(&raw, quote);
        if requoted != raw {
            out.replace_range(printed.offset(span.lo)..printed.offset(span.hi), &requoted);
        }
    }
    Ok(out)
}

/// Prints the document with `config` applied.
pub fn print(doc: &Document, config: &FormatConfig) -> Result<String> {
    config.validate()?;

    let text = layout(doc)?;
    let text = requote_all(doc, &text, config.quote.as_char())?;
    let text = text.replace("\r\n", "\n");
    Ok(match config.new_line {
        NewLine::Lf => text,
        NewLine::CrLf => text.replace('\n', "\r\n"),
    })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn requote_switches_quotes() {
        assert_eq!(requote(r#""vue""#, '\''), "'vue'");
        assert_eq!(requote("'vue'", '\''), "'vue'");
        assert_eq!(requote("'vue'", '"'), r#""vue""#);
    }

    #[test]
    fn requote_fixes_escapes_for_the_new_quote() {
        assert_eq!(requote(r#""it's""#, '\''), r"'it\'s'");
        assert_eq!(requote(r#""say \"hi\"""#, '\''), r#"'say "hi"'"#);
        assert_eq!(requote(r#""a\nb\\""#, '\''), r"'a\nb\\'");
    }

    #[test]
    fn string_literal_escapes() {
        let config = FormatConfig::default();
        insta::assert_snapshot!(config.string_literal("O'Neil\\"), @r"'O\'Neil\\'");
    }

    #[test]
    fn indent_strings() {
        assert_eq!(Indent::Spaces(2).as_str(), "  ");
        assert_eq!(Indent::Spaces(4).as_str(), "    ");
        assert_eq!(Indent::Tab.as_str(), "\t");
        assert_eq!(FormatConfig::default().indent_at(3), "      ");
    }

    #[test]
    fn validate_checks_the_indent_width() {
        let tight = FormatConfig {
            trailing_commas: true,
            bracket_spacing: false,
            ..FormatConfig::default()
        };
        assert!(tight.validate().is_ok());

        let wide = FormatConfig {
            indent: Indent::Spaces(0),
            ..FormatConfig::default()
        };
        assert!(matches!(wide.validate(), Err(Error::UnsupportedFormat(_))));
        assert!(FormatConfig::default().validate().is_ok());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: FormatConfig =
            serde_json::from_str(r#"{ "indent": { "spaces": 4 }, "quote": "double", "newLine": "crlf" }"#)
                .unwrap();

        assert_eq!(config.indent, Indent::Spaces(4));
        assert_eq!(config.quote, QuoteStyle::Double);
        assert_eq!(config.new_line, NewLine::CrLf);
        assert!(!config.trailing_commas);
        assert!(config.bracket_spacing);

        let tab: FormatConfig = serde_json::from_str(r#"{ "indent": "tab" }"#).unwrap();
        assert_eq!(tab.indent, Indent::Tab);
        assert_eq!(tab.quote, QuoteStyle::Single);
    }

    #[test]
    fn print_applies_quote_style() {
        let doc = Document::parse("a.ts", r#"import Vue from "vue";"#).unwrap();
        let code = print(&doc, &FormatConfig::default()).unwrap();
        assert_eq!(code, "import Vue from 'vue';\n");
    }

    #[test]
    fn untouched_items_keep_their_layout_and_comments() {
        let source = indoc! {r#"
            #!/usr/bin/env node
            // header

            import Vue from "vue";
            const a   = { b: 1 }; // trailing
            /* between */

            function f() {
                return "x";
            }
            // end of file
        "#};
        let doc = Document::parse("a.ts", source).unwrap();

        let code = print(&doc, &FormatConfig::default()).unwrap();
        assert_eq!(code, source.replace('"', "'"));
    }

    #[test]
    fn print_applies_the_newline() {
        let doc = Document::parse("a.ts", "const a = 1;\r\nconst b = 'x';\r\n").unwrap();

        let lf = print(&doc, &FormatConfig::default()).unwrap();
        assert_eq!(lf, "const a = 1;\nconst b = 'x';\n");

        let crlf = FormatConfig {
            new_line: NewLine::CrLf,
            quote: QuoteStyle::Double,
            ..FormatConfig::default()
        };
        assert_eq!(print(&doc, &crlf).unwrap(), "const a = 1;\r\nconst b = \"x\";\r\n");
    }

    #[test]
    fn synthesized_items_get_blank_lines_around_them() {
        let mut doc = Document::parse("a.ts", "import a from 'a';\nconst x = 1;\n").unwrap();
        let imports = doc.parse_items("import b from 'b';").unwrap();
        let stmts = doc.parse_items("const y = 2;").unwrap();
        doc.module.body.splice(1..1, imports);
        doc.module.body.extend(stmts);

        let code = print(&doc, &FormatConfig::default()).unwrap();
        assert_eq!(code, "import a from 'a';\nimport b from 'b';\n\nconst x = 1;\n\nconst y = 2;\n");
    }
}
