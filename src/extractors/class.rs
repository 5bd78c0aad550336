use std::collections::BTreeSet;

use swc_common::comments::Comment;
use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::*;
use tracing::debug;

use crate::component::*;
use crate::docs::doc_lines;
use crate::document::{full_span, Document};
use crate::error::{report, Error, Result, Warning};
use crate::extractors::decorators::{self, DecoratorCall, DecoratorNames};

/// Walks the top level of a module looking for the first decorated class component.
pub struct ClassExtractor<'a> {
    doc: &'a Document,
    names: &'a DecoratorNames,
    warnings: &'a mut Vec<Warning>,
}

/// Class declared by a top-level item, with its identifier if it has one.
fn class_of(item: &ModuleItem) -> Option<(Option<&Ident>, &Class)> {
    match item {
        ModuleItem::Stmt(Stmt::Decl(Decl::Class(decl))) => Some((Some(&decl.ident), &*decl.class)),
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &export.decl {
            Decl::Class(decl) => Some((Some(&decl.ident), &*decl.class)),
            _ => None,
        },
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &export.decl {
            DefaultDecl::Class(expr) => Some((expr.ident.as_ref(), &*expr.class)),
            _ => None,
        },
        _ => None,
    }
}

/// Static key text, if the key has one.
pub(crate) fn prop_name_text(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(String::from_utf8_lossy(s.value.as_bytes()).to_string()),
        PropName::Num(n) => Some(n.value.to_string()),
        _ => None,
    }
}

fn config_key(prop: &PropOrSpread) -> Option<String> {
    let PropOrSpread::Prop(prop) = prop else {
        return None;
    };
    match &**prop {
        Prop::Shorthand(ident) => Some(ident.sym.to_string()),
        Prop::KeyValue(kv) => prop_name_text(&kv.key),
        Prop::Method(method) => prop_name_text(&method.key),
        Prop::Getter(getter) => prop_name_text(&getter.key),
        Prop::Setter(setter) => prop_name_text(&setter.key),
        _ => None,
    }
}

/// Expressions that stay intact when followed by `as T`.
fn is_primary(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Lit(_)
            | Expr::Ident(_)
            | Expr::This(_)
            | Expr::Array(_)
            | Expr::Object(_)
            | Expr::Call(_)
            | Expr::New(_)
            | Expr::Member(_)
            | Expr::OptChain(_)
            | Expr::Tpl(_)
            | Expr::TaggedTpl(_)
            | Expr::Paren(_)
    )
}

fn member_label(member: &ClassMember) -> String {
    match member {
        ClassMember::Constructor(_) => "constructor".to_string(),
        ClassMember::Method(method) => {
            prop_name_text(&method.key).unwrap_or_else(|| "<computed method>".to_string())
        }
        ClassMember::ClassProp(prop) => {
            prop_name_text(&prop.key).unwrap_or_else(|| "<computed field>".to_string())
        }
        ClassMember::PrivateMethod(method) => format!("#{}", method.key.name),
        ClassMember::PrivateProp(prop) => format!("#{}", prop.key.name),
        ClassMember::StaticBlock(_) => "static block".to_string(),
        ClassMember::TsIndexSignature(_) => "index signature".to_string(),
        _ => "<member>".to_string(),
    }
}

impl<'a> ClassExtractor<'a> {
    pub fn new(doc: &'a Document, names: &'a DecoratorNames, warnings: &'a mut Vec<Warning>) -> Self {
        Self { doc, names, warnings }
    }

    /// Extracts the first decorated class, if any.
    ///
    /// Later decorated classes are reported and left alone.
    pub fn extract(mut self) -> Result<Option<ComponentIr>> {
        let doc = self.doc;
        let names = self.names;
        let mut found: Option<ComponentIr> = None;
        let mut skipped = Vec::new();

        for item in &doc.module.body {
            let Some((ident, class)) = class_of(item) else {
                continue;
            };
            let Some(call) = decorators::find(&class.decorators, &names.component) else {
                continue;
            };
            let name = ident.map(|ident| ident.sym.to_string());

            if found.is_some() {
                skipped.push(name.unwrap_or_else(|| "<anonymous>".to_string()));
                continue;
            }

            debug!(component = name.as_deref().unwrap_or("<anonymous>"), "found class component");
            found = Some(self.component(item, name, class, call)?);
        }

        if !skipped.is_empty() {
            report(self.warnings, Warning::MultipleComponents { skipped });
        }
        Ok(found)
    }

    fn component(
        &mut self,
        item: &ModuleItem,
        name: Option<String>,
        class: &Class,
        call: DecoratorCall<'_>,
    ) -> Result<ComponentIr> {
        let config = match call {
            DecoratorCall::Bare | DecoratorCall::Empty => None,
            DecoratorCall::Object(object) => Some(self.config(object)?),
            DecoratorCall::Other => {
                return Err(Error::MalformedConfig {
                    class: name.unwrap_or_else(|| "<anonymous>".to_string()),
                })
            }
        };

        let mut body = BodyComments::new(self.doc.comments_within(class.span));
        body.cover(class.decorators.iter().map(|decorator| decorator.span));

        let mut ir = ComponentIr {
            item_span: item.span(),
            docs: self.class_docs(item, class, &mut body),
            name,
            config,
            input_fields: Vec::new(),
            state_fields: Vec::new(),
        };

        for member in &class.body {
            match member {
                ClassMember::ClassProp(prop) if !prop.is_static => self.field(prop, &mut ir, &mut body)?,
                ClassMember::Empty(_) => {}
                other => {
                    body.cover([other.span()]);
                    report(
                        self.warnings,
                        Warning::UnsupportedMember {
                            member: member_label(other),
                        },
                    );
                }
            }
        }

        let loose = doc_lines(&body.loose());
        if !loose.is_empty() {
            debug!(lines = loose.len(), "moving loose class body comments to the component docs");
            if !ir.docs.is_empty() {
                ir.docs.push(String::new());
            }
            ir.docs.extend(loose);
        }

        Ok(ir)
    }

    /// Takes the comments leading the class out of the store and returns their lines.
    fn class_docs(&self, item: &ModuleItem, class: &Class, body: &mut BodyComments) -> Vec<String> {
        let mut positions = BTreeSet::new();
        positions.insert(item.span().lo);
        positions.insert(full_span(item).lo);
        positions.insert(class.span.lo);
        positions.extend(class.decorators.iter().map(|decorator| decorator.span.lo));

        let mut comments: Vec<_> = positions
            .into_iter()
            .flat_map(|pos| self.doc.take_leading_comments(pos))
            .collect();
        comments.sort_by_key(|comment| comment.span.lo);
        body.claim(&comments);
        doc_lines(&comments)
    }

    fn config(&mut self, object: &ObjectLit) -> Result<Vec<ConfigEntry>> {
        let mut entries = Vec::with_capacity(object.props.len());

        for prop in &object.props {
            let key = config_key(prop);
            if let Some(key) = key.as_deref().filter(|key| matches!(*key, "name" | "props" | "data")) {
                report(self.warnings, Warning::KeyCollision { key: key.to_string() });
            }
            entries.push(ConfigEntry {
                key,
                text: self.doc.snippet_block(prop.span())?,
            });
        }

        Ok(entries)
    }

    fn field(&mut self, prop: &ClassProp, ir: &mut ComponentIr, body: &mut BodyComments) -> Result<()> {
        let Some(name) = prop_name_text(&prop.key) else {
            body.cover([prop.span]);
            report(
                self.warnings,
                Warning::UnsupportedMember {
                    member: "<computed field>".to_string(),
                },
            );
            return Ok(());
        };

        body.cover(prop.decorators.iter().map(|decorator| decorator.span));
        body.cover(prop.value.iter().map(|value| value.span()));
        body.cover(prop.type_ann.iter().map(|ann| ann.span));

        let key = self.doc.snippet(prop.key.span())?;
        let declared_type = match &prop.type_ann {
            Some(ann) => Some(self.doc.snippet(ann.type_ann.span())?),
            None => None,
        };

        if let Some(call) = decorators::find(&prop.decorators, &self.names.prop) {
            let options = match call {
                DecoratorCall::Bare | DecoratorCall::Empty => None,
                DecoratorCall::Object(object) => Some(object),
                DecoratorCall::Other => return Err(Error::MalformedPropOptions { field: name }),
            };
            let (default_entry, required_entry) = match options {
                Some(object) => self.prop_options(object)?,
                None => (None, None),
            };
            let type_tag = match (&prop.type_ann, &declared_type) {
                (Some(ann), Some(text)) => Some(TypeTag::classify(&ann.type_ann, text)),
                _ => None,
            };

            ir.input_fields.push(InputField {
                key,
                declared_type,
                type_tag,
                docs: self.field_docs(prop, body),
                default_entry,
                required_entry,
            });
        } else if let Some(value) = &prop.value {
            ir.state_fields.push(StateField {
                key,
                initializer: self.doc.snippet_block(value.span())?,
                needs_parens: !is_primary(value),
                declared_type,
                docs: self.field_docs(prop, body),
            });
        } else {
            report(self.warnings, Warning::SkippedField { field: name });
        }

        Ok(())
    }

    /// `default` and `required` entries of the input-field options, verbatim.
    fn prop_options(&self, object: &ObjectLit) -> Result<(Option<String>, Option<String>)> {
        let mut default_entry = None;
        let mut required_entry = None;

        for prop in &object.props {
            match config_key(prop).as_deref() {
                Some("default") => default_entry = Some(self.doc.snippet_block(prop.span())?),
                Some("required") => required_entry = Some(self.doc.snippet_block(prop.span())?),
                _ => {}
            }
        }

        Ok((default_entry, required_entry))
    }

    /// Leading comments of the field, then comments that follow it on its last line.
    fn field_docs(&self, prop: &ClassProp, body: &mut BodyComments) -> Vec<String> {
        let mut positions: BTreeSet<BytePos> = BTreeSet::new();
        positions.insert(prop.span.lo);
        positions.insert(prop.key.span().lo);
        positions.extend(prop.decorators.iter().map(|decorator| decorator.span.lo));

        let mut comments: Vec<_> = positions
            .into_iter()
            .flat_map(|pos| self.doc.leading_comments(pos))
            .collect();

        let last_line = self.doc.line_of(prop.span.hi);
        comments.extend(
            body.unclaimed()
                .filter(|comment| comment.span.lo >= prop.span.hi)
                .filter(|comment| self.doc.line_of(comment.span.lo) == last_line)
                .cloned(),
        );

        body.claim(&comments);
        doc_lines(&comments)
    }
}

/// Comments inside the class, tracked until each one has a place in the output.
struct BodyComments {
    all: Vec<Comment>,
    claimed: BTreeSet<BytePos>,
    /// Spans whose text is carried over verbatim, or dropped with a warning.
    covered: Vec<Span>,
}

impl BodyComments {
    fn new(all: Vec<Comment>) -> Self {
        Self {
            all,
            claimed: BTreeSet::new(),
            covered: Vec::new(),
        }
    }

    fn claim(&mut self, comments: &[Comment]) {
        self.claimed.extend(comments.iter().map(|comment| comment.span.lo));
    }

    fn cover(&mut self, spans: impl IntoIterator<Item = Span>) {
        self.covered.extend(spans);
    }

    fn unclaimed(&self) -> impl Iterator<Item = &Comment> + '_ {
        self.all
            .iter()
            .filter(|comment| !self.claimed.contains(&comment.span.lo))
            .filter(|comment| !self.covered.iter().any(|span| span.contains(comment.span)))
    }

    /// Comments neither claimed as documentation nor inside covered text.
    fn loose(&self) -> Vec<Comment> {
        self.unclaimed().cloned().collect()
    }
}
