//! One parsed source file together with the swc session state it was parsed in.

use swc_common::comments::{Comment, Comments, SingleThreadedComments};
use swc_common::errors::SourceMapper;
use swc_common::sync::Lrc;
use swc_common::{BytePos, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::{
    Decl, DefaultDecl, EsVersion, ExportDecl, ExportDefaultDecl, Module, ModuleDecl, ModuleItem, Stmt,
};
use swc_ecma_parser::{parse_file_as_module, Syntax, TsSyntax};

use crate::error::{Error, Result};
use crate::format::FormatConfig;

/// A source file under transformation.
///
/// The source map and comment store are shared by every fragment parsed through
/// [`Document::parse_items`], so synthesized code keeps its comments and spans
/// when it is spliced into [`Document::module`] and printed.
pub struct Document {
    pub(crate) cm: Lrc<SourceMap>,
    pub(crate) comments: SingleThreadedComments,
    pub module: Module,
    pub(crate) format: FormatConfig,
    name: String,
    source: String,
    start: BytePos,
    end: BytePos,
    fragments: usize,
}

fn syntax() -> Syntax {
    Syntax::Typescript(TsSyntax {
        decorators: true,
        ..Default::default()
    })
}

/// Span of a top-level item, widened to decorators written before it.
pub(crate) fn full_span(item: &ModuleItem) -> Span {
    let span = item.span();
    let decorators = match item {
        ModuleItem::Stmt(Stmt::Decl(Decl::Class(decl))) => &decl.class.decorators,
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl {
            decl: Decl::Class(decl),
            ..
        })) => &decl.class.decorators,
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(ExportDefaultDecl {
            decl: DefaultDecl::Class(expr),
            ..
        })) => &expr.class.decorators,
        _ => return span,
    };
    match decorators.first() {
        Some(first) if first.span.lo < span.lo => span.with_lo(first.span.lo),
        _ => span,
    }
}

impl Document {
    pub fn parse(name: &str, source: &str) -> Result<Self> {
        let cm: Lrc<SourceMap> = Default::default();
        let comments = SingleThreadedComments::default();
        let (module, start, end) = parse_into(&cm, &comments, name.to_string(), source.to_string())?;

        Ok(Self {
            cm,
            comments,
            module,
            format: FormatConfig::default(),
            name: name.to_string(),
            source: source.to_string(),
            start,
            end,
            fragments: 0,
        })
    }

    /// Style used for code this document synthesizes.
    pub fn with_format(mut self, format: FormatConfig) -> Self {
        self.format = format;
        self
    }

    /// Verbatim source text covered by `span`, in the original file or in a fragment.
    pub fn snippet(&self, span: Span) -> Result<String> {
        self.cm.span_to_snippet(span).map_err(|_| Error::Snippet {
            lo: span.lo.0,
            hi: span.hi.0,
        })
    }

    /// Like [`Document::snippet`], with the indentation of the first line's
    /// source line removed from every following line.
    ///
    /// Template literals are returned as written.
    pub fn snippet_block(&self, span: Span) -> Result<String> {
        let text = self.snippet(span)?;
        if !text.contains('\n') || text.contains('`') {
            return Ok(text);
        }

        let base = self.line_indent(span.lo);
        let mut lines = text.lines();
        let mut out = lines.next().unwrap_or_default().to_string();
        for line in lines {
            out.push('\n');
            out.push_str(line.strip_prefix(base.as_str()).unwrap_or_else(|| line.trim_start()));
        }
        Ok(out)
    }

    fn line_indent(&self, pos: BytePos) -> String {
        let loc = self.cm.lookup_char_pos(pos);
        loc.file
            .get_line(loc.line - 1)
            .map(|line| line.chars().take_while(|c| *c == ' ' || *c == '\t').collect())
            .unwrap_or_default()
    }

    /// 1-based line of `pos`.
    pub fn line_of(&self, pos: BytePos) -> usize {
        self.cm.lookup_char_pos(pos).line
    }

    /// Whether `pos` points into the original file rather than a fragment.
    pub fn is_original(&self, pos: BytePos) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset of `pos` in the original text.
    pub(crate) fn offset(&self, pos: BytePos) -> usize {
        (pos.0 - self.start.0) as usize
    }

    /// Whether the original text between `from` and `to` holds an empty line.
    pub fn blank_line_between(&self, from: BytePos, to: BytePos) -> bool {
        if !self.is_original(from) || !self.is_original(to) || to <= from {
            return false;
        }
        let Some(gap) = self.source.get(self.offset(from)..self.offset(to)) else {
            return false;
        };

        let parts: Vec<_> = gap.split('\n').collect();
        parts.len() > 2 && parts[1..parts.len() - 1].iter().any(|part| part.trim().is_empty())
    }

    /// Parses synthesized text into module items that live in this document's session.
    pub fn parse_items(&mut self, text: &str) -> Result<Vec<ModuleItem>> {
        self.fragments += 1;
        let name = format!("{}#fragment-{}", self.name, self.fragments);
        let (module, _, _) = parse_into(&self.cm, &self.comments, name, text.to_string())?;
        Ok(module.body)
    }

    pub fn leading_comments(&self, pos: BytePos) -> Vec<Comment> {
        self.comments.get_leading(pos).unwrap_or_default()
    }

    pub fn trailing_comments(&self, pos: BytePos) -> Vec<Comment> {
        self.comments.get_trailing(pos).unwrap_or_default()
    }

    /// Removes the leading comments at `pos` so they are not printed there.
    pub fn take_leading_comments(&self, pos: BytePos) -> Vec<Comment> {
        self.comments.take_leading(pos).unwrap_or_default()
    }

    /// Places `comments` before whatever comments already lead `pos`.
    pub fn prepend_leading_comments(&self, pos: BytePos, comments: Vec<Comment>) {
        if comments.is_empty() {
            return;
        }
        let existing = self.take_leading_comments(pos);
        self.comments.add_leading_comments(pos, comments);
        if !existing.is_empty() {
            self.comments.add_leading_comments(pos, existing);
        }
    }

    /// Moves the comments around `from` to the same places around `to`.
    pub fn move_comments(&self, from: Span, to: Span) {
        self.prepend_leading_comments(to.lo, self.take_leading_comments(from.lo));
        self.move_trailing_comments(from.hi, to.hi);
    }

    pub fn move_trailing_comments(&self, from: BytePos, to: BytePos) {
        if let Some(trailing) = self.comments.take_trailing(from) {
            self.comments.add_trailing_comments(to, trailing);
        }
    }

    /// Every comment lying inside `span`, in source order.
    pub fn comments_within(&self, span: Span) -> Vec<Comment> {
        let (leading, trailing) = self.comments.borrow_all();
        let mut found: Vec<Comment> = leading
            .values()
            .chain(trailing.values())
            .flatten()
            .filter(|comment| span.lo <= comment.span.lo && comment.span.hi <= span.hi)
            .cloned()
            .collect();
        found.sort_by_key(|comment| comment.span.lo);
        found.dedup_by_key(|comment| comment.span.lo);
        found
    }

    /// Prints the module with `format` applied.
    pub fn print(&self, format: &FormatConfig) -> Result<String> {
        crate::format::print(self, format)
    }

    /// Index of the top-level item whose span is exactly `span`.
    pub fn position_of(&self, span: Span) -> Option<usize> {
        self.module.body.iter().position(|item| item.span() == span)
    }
}

fn parse_into(
    cm: &Lrc<SourceMap>,
    comments: &SingleThreadedComments,
    name: String,
    text: String,
) -> Result<(Module, BytePos, BytePos)> {
    let fm = cm.new_source_file(Lrc::new(FileName::Custom(name.clone())), text);
    let mut recovered = Vec::new();

    let parse_error = |err: swc_ecma_parser::error::Error| {
        let loc = cm.lookup_char_pos(err.span().lo);
        Error::Parse {
            file: name.clone(),
            line: loc.line,
            column: loc.col_display + 1,
            message: err.kind().msg().to_string(),
        }
    };

    let module = parse_file_as_module(
        &fm,
        syntax(),
        EsVersion::latest(),
        Some(comments),
        &mut recovered,
    )
    .map_err(parse_error)?;

    // Recovered errors still mean the file is not what it claims to be.
    if let Some(err) = recovered.into_iter().next() {
        return Err(parse_error(err));
    }

    Ok((module, fm.start_pos, fm.end_pos))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn snippet_returns_verbatim_text() {
        let doc = Document::parse("a.ts", "const answer = 40 + 2;").unwrap();
        let span = doc.module.body[0].span();
        assert_eq!(doc.snippet(span).unwrap(), "const answer = 40 + 2;");
    }

    #[test]
    fn snippet_block_drops_the_source_indentation() {
        let doc = Document::parse(
            "a.ts",
            indoc! {"
                class A {
                    items = [
                        1,
                        2,
                    ];
                }
            "},
        )
        .unwrap();
        let ModuleItem::Stmt(Stmt::Decl(Decl::Class(class))) = &doc.module.body[0] else {
            panic!("expected a class");
        };
        let swc_ecma_ast::ClassMember::ClassProp(prop) = &class.class.body[0] else {
            panic!("expected a field");
        };

        let text = doc.snippet_block(prop.value.as_ref().unwrap().span()).unwrap();
        assert_eq!(text, "[\n    1,\n    2,\n]");
    }

    #[test]
    fn fragments_share_the_comment_store() {
        let mut doc = Document::parse("a.ts", "const a = 1;").unwrap();
        let items = doc.parse_items("/** hello */\nconst b = 2;").unwrap();

        let comments = doc.leading_comments(items[0].span().lo);
        assert_eq!(comments.len(), 1);
        assert_eq!(&*comments[0].text, "* hello ");
        assert!(!doc.is_original(items[0].span().lo));
    }

    #[test]
    fn blank_lines_are_detected() {
        let doc = Document::parse("a.ts", "const a = 1; // one\n\nconst b = 2;\nconst c = 3;").unwrap();
        let spans: Vec<_> = doc.module.body.iter().map(|item| item.span()).collect();

        assert!(doc.blank_line_between(spans[0].hi, spans[1].lo));
        assert!(!doc.blank_line_between(spans[1].hi, spans[2].lo));
    }

    #[test]
    fn comments_within_a_span() {
        let doc = Document::parse(
            "a.ts",
            "// before\nclass A {\n  a = 1; // after a\n  /* loose */\n}\n",
        )
        .unwrap();
        let span = doc.module.body[0].span();

        let texts: Vec<_> = doc
            .comments_within(span)
            .iter()
            .map(|comment| comment.text.to_string())
            .collect();
        assert_eq!(texts, vec![" after a", " loose "]);
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = Document::parse("broken.ts", "class {").err().unwrap();
        assert!(matches!(err, Error::Parse { ref file, .. } if file == "broken.ts"));
    }
}
