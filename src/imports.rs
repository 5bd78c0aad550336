//! Import ledger: idempotent edits of a module's import declarations.

use swc_common::Spanned;
use swc_ecma_ast::{
    ImportDecl, ImportNamedSpecifier, ImportSpecifier, Module, ModuleDecl, ModuleExportName,
    ModuleItem,
};
use tracing::debug;

use crate::document::{full_span, Document};
use crate::error::{Error, Result};
use crate::format::FormatConfig;

/// Module providing the base class, the `extend` factory and `PropType`.
pub const BASE_MODULE: &str = "vue";
/// Local name given to a newly added default import of [`BASE_MODULE`].
pub const BASE_DEFAULT: &str = "Vue";
/// Generic type-tag helper exported by [`BASE_MODULE`].
pub const PROP_TYPE: &str = "PropType";

pub const PROPERTY_DECORATOR_MODULE: &str = "vue-property-decorator";
pub const CLASS_COMPONENT_MODULE: &str = "vue-class-component";
pub const DECORATOR_MODULES: [&str; 2] = [PROPERTY_DECORATOR_MODULE, CLASS_COMPONENT_MODULE];

/// Bindings a caller needs from one module.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportRequest<'a> {
    pub default: Option<&'a str>,
    pub named: &'a [&'a str],
}

/// Local names the requested bindings are available under after [`ensure`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportBindings {
    pub default: Option<String>,
    /// In request order.
    pub named: Vec<String>,
}

pub(crate) fn import_source(decl: &ImportDecl) -> String {
    String::from_utf8_lossy(decl.src.value.as_bytes()).to_string()
}

pub(crate) fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => String::from_utf8_lossy(s.value.as_bytes()).to_string(),
    }
}

/// Name a named specifier imports, which differs from its local name when aliased.
pub(crate) fn imported_name(spec: &ImportNamedSpecifier) -> String {
    spec.imported
        .as_ref()
        .map(export_name)
        .unwrap_or_else(|| spec.local.sym.to_string())
}

pub(crate) fn imports(module: &Module) -> impl Iterator<Item = &ImportDecl> {
    module.body.iter().filter_map(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => Some(decl),
        _ => None,
    })
}

fn imports_from<'a>(module: &'a Module, source: &'a str) -> impl Iterator<Item = &'a ImportDecl> + 'a {
    imports(module).filter(move |decl| import_source(decl) == source)
}

fn existing_default(module: &Module, source: &str) -> Option<String> {
    imports_from(module, source)
        .filter(|decl| !decl.type_only)
        .flat_map(|decl| decl.specifiers.iter())
        .find_map(|spec| match spec {
            ImportSpecifier::Default(default) => Some(default.local.sym.to_string()),
            _ => None,
        })
}

fn existing_named(module: &Module, source: &str, name: &str) -> Option<String> {
    imports_from(module, source)
        .flat_map(|decl| decl.specifiers.iter())
        .find_map(|spec| match spec {
            ImportSpecifier::Named(named) if imported_name(named) == name => {
                Some(named.local.sym.to_string())
            }
            _ => None,
        })
}

/// Index of a value import of `source` that can take one more specifier.
///
/// Named specifiers cannot share a declaration with a namespace specifier.
fn host(module: &Module, source: &str, named: bool) -> Option<usize> {
    module.body.iter().position(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => {
            !decl.type_only
                && decl.with.is_none()
                && import_source(decl) == source
                && !(named
                    && decl
                        .specifiers
                        .iter()
                        .any(|spec| matches!(spec, ImportSpecifier::Namespace(_))))
        }
        _ => false,
    })
}

/// Bindings of one import declaration, as text.
#[derive(Debug, Default)]
struct ImportClause {
    default: Option<String>,
    namespace: Option<String>,
    named: Vec<String>,
}

impl ImportClause {
    fn of(decl: &ImportDecl) -> Self {
        let mut clause = Self::default();
        for spec in &decl.specifiers {
            match spec {
                ImportSpecifier::Default(default) => clause.default = Some(default.local.sym.to_string()),
                ImportSpecifier::Namespace(ns) => clause.namespace = Some(format!("* as {}", ns.local.sym)),
                ImportSpecifier::Named(named) => {
                    let imported = imported_name(named);
                    let mut text = String::new();
                    if named.is_type_only {
                        text.push_str("type ");
                    }
                    if imported != *named.local.sym {
                        text.push_str(&imported);
                        text.push_str(" as ");
                    }
                    text.push_str(&named.local.sym);
                    clause.named.push(text);
                }
            }
        }
        clause
    }

    fn render(&self, source: &str, format: &FormatConfig) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(3);
        parts.extend(self.default.clone());
        parts.extend(self.namespace.clone());
        if !self.named.is_empty() {
            let named = self.named.join(", ");
            parts.push(if format.bracket_spacing {
                format!("{{ {named} }}")
            } else {
                format!("{{{named}}}")
            });
        }
        format!("import {} from {};", parts.join(", "), format.string_literal(source))
    }
}

/// Parses `text`, which must hold exactly one import declaration.
fn parse_import(doc: &mut Document, text: &str) -> Result<ModuleItem> {
    doc.parse_items(text)?
        .into_iter()
        .find(|item| matches!(item, ModuleItem::ModuleDecl(ModuleDecl::Import(_))))
        .ok_or_else(|| Error::Synthesis(format!("no import declaration in `{text}`")))
}

/// Rewrites the import at `index` with `edit` applied to its bindings.
fn rewrite_import(
    doc: &mut Document,
    index: usize,
    edit: impl FnOnce(&mut ImportClause),
) -> Result<()> {
    let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = &doc.module.body[index] else {
        return Err(Error::Synthesis(format!("item {index} is not an import")));
    };
    let source = import_source(decl);
    let old = decl.span;
    let mut clause = ImportClause::of(decl);
    edit(&mut clause);

    let text = clause.render(&source, &doc.format);
    let item = parse_import(doc, &text)?;
    doc.move_comments(old, item.span());
    doc.module.body[index] = item;
    Ok(())
}

/// Inserts a new import declaration after the last existing import.
fn insert_import(doc: &mut Document, source: &str, clause: ImportClause) -> Result<()> {
    let text = clause.render(source, &doc.format);
    let item = parse_import(doc, &text)?;
    let at = doc
        .module
        .body
        .iter()
        .rposition(|item| matches!(item, ModuleItem::ModuleDecl(ModuleDecl::Import(_))))
        .map_or(0, |index| index + 1);

    doc.module.body.insert(at, item);
    Ok(())
}

/// Makes sure `source` is imported with the requested bindings.
///
/// Existing bindings are reused, whatever their local name; nothing else is touched.
pub fn ensure(doc: &mut Document, source: &str, request: &ImportRequest<'_>) -> Result<ImportBindings> {
    let mut bindings = ImportBindings::default();

    if let Some(default) = request.default {
        let local = match existing_default(&doc.module, source) {
            Some(local) => local,
            None => {
                match host(&doc.module, source, false) {
                    Some(index) => {
                        rewrite_import(doc, index, |clause| clause.default = Some(default.to_string()))?
                    }
                    None => insert_import(
                        doc,
                        source,
                        ImportClause {
                            default: Some(default.to_string()),
                            ..ImportClause::default()
                        },
                    )?,
                }
                debug!(source, default, "added default import");
                default.to_string()
            }
        };
        bindings.default = Some(local);
    }

    for &name in request.named {
        let local = match existing_named(&doc.module, source, name) {
            Some(local) => local,
            None => {
                match host(&doc.module, source, true) {
                    Some(index) => rewrite_import(doc, index, |clause| clause.named.push(name.to_string()))?,
                    None => insert_import(
                        doc,
                        source,
                        ImportClause {
                            named: vec![name.to_string()],
                            ..ImportClause::default()
                        },
                    )?,
                }
                debug!(source, name, "added named import");
                name.to_string()
            }
        };
        bindings.named.push(local);
    }

    Ok(bindings)
}

fn is_decorator_import(item: &ModuleItem) -> bool {
    match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => {
            DECORATOR_MODULES.contains(&import_source(decl).as_str())
        }
        _ => false,
    }
}

/// Drops every import of a decorator-convention module and, if any was dropped,
/// makes sure the base module is imported by default.
///
/// Comments leading the first statement of the file survive the removal.
pub fn collapse_decorator_imports(doc: &mut Document) -> Result<bool> {
    let header = match doc.module.body.first() {
        Some(first) if is_decorator_import(first) => doc.take_leading_comments(first.span().lo),
        _ => Vec::new(),
    };

    let before = doc.module.body.len();
    doc.module.body.retain(|item| !is_decorator_import(item));
    let removed = before - doc.module.body.len();

    if removed == 0 {
        return Ok(false);
    }
    debug!(removed, "removed decorator-convention imports");

    ensure(
        doc,
        BASE_MODULE,
        &ImportRequest {
            default: Some(BASE_DEFAULT),
            named: &[],
        },
    )?;

    if let Some(first) = doc.module.body.first() {
        doc.prepend_leading_comments(full_span(first).lo, header);
    }
    Ok(true)
}
