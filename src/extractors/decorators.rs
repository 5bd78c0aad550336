use std::collections::HashSet;

use swc_ecma_ast::{Callee, Decorator, Expr, ImportSpecifier, Module, ObjectLit};

use crate::imports::{
    import_source, imported_name, imports, CLASS_COMPONENT_MODULE, PROPERTY_DECORATOR_MODULE,
};

/// Local names the two decorators are bound to in one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoratorNames {
    pub component: Vec<String>,
    pub prop: Vec<String>,
}

impl Default for DecoratorNames {
    fn default() -> Self {
        Self {
            component: vec!["Component".to_string()],
            prop: vec!["Prop".to_string()],
        }
    }
}

impl DecoratorNames {
    /// Reads the bindings from the decorator-convention imports.
    ///
    /// A decorator that is not imported falls back to its canonical name, unless
    /// that name is bound by an import from some other module.
    pub fn resolve(module: &Module) -> Self {
        let mut component = Vec::new();
        let mut prop = Vec::new();
        let mut bound = HashSet::new();

        for decl in imports(module) {
            let source = import_source(decl);
            for spec in &decl.specifiers {
                bound.insert(local_name(spec));
                match (source.as_str(), spec) {
                    (CLASS_COMPONENT_MODULE, ImportSpecifier::Default(default)) => {
                        component.push(default.local.sym.to_string());
                    }
                    (CLASS_COMPONENT_MODULE | PROPERTY_DECORATOR_MODULE, ImportSpecifier::Named(named)) => {
                        match imported_name(named).as_str() {
                            "Component" => component.push(named.local.sym.to_string()),
                            "Prop" if source == PROPERTY_DECORATOR_MODULE => {
                                prop.push(named.local.sym.to_string());
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }
        }

        let fallback = |names: Vec<String>, canonical: &str| {
            if names.is_empty() && !bound.contains(canonical) {
                vec![canonical.to_string()]
            } else {
                names
            }
        };
        Self {
            component: fallback(component, "Component"),
            prop: fallback(prop, "Prop"),
        }
    }
}

fn local_name(spec: &ImportSpecifier) -> String {
    match spec {
        ImportSpecifier::Default(default) => default.local.sym.to_string(),
        ImportSpecifier::Named(named) => named.local.sym.to_string(),
        ImportSpecifier::Namespace(ns) => ns.local.sym.to_string(),
    }
}

/// How a recognized decorator was applied.
#[derive(Clone, Copy, Debug)]
pub enum DecoratorCall<'a> {
    /// `@Name`
    Bare,
    /// `@Name()`
    Empty,
    /// `@Name({ ... })`
    Object(&'a ObjectLit),
    /// Any other argument list.
    Other,
}

impl<'a> DecoratorCall<'a> {
    /// Matches `decorator` against `names`.
    pub fn of(decorator: &'a Decorator, names: &[String]) -> Option<Self> {
        let is_named = |sym: &str| names.iter().any(|name| name == sym);

        match &*decorator.expr {
            Expr::Ident(ident) if is_named(&*ident.sym) => Some(DecoratorCall::Bare),
            Expr::Call(call) => {
                let Callee::Expr(callee) = &call.callee else {
                    return None;
                };
                let Expr::Ident(ident) = &**callee else {
                    return None;
                };
                if !is_named(&*ident.sym) {
                    return None;
                }

                match call.args.as_slice() {
                    [] => Some(DecoratorCall::Empty),
                    [arg] if arg.spread.is_none() => match &*arg.expr {
                        Expr::Object(object) => Some(DecoratorCall::Object(object)),
                        _ => Some(DecoratorCall::Other),
                    },
                    _ => Some(DecoratorCall::Other),
                }
            }
            _ => None,
        }
    }
}

/// First decorator in `decorators` that matches `names`.
pub fn find<'a>(decorators: &'a [Decorator], names: &[String]) -> Option<DecoratorCall<'a>> {
    decorators.iter().find_map(|decorator| DecoratorCall::of(decorator, names))
}
