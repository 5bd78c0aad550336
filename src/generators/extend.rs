use swc_common::Spanned;
use tracing::debug;

use crate::component::*;
use crate::docs;
use crate::document::{full_span, Document};
use crate::error::{Error, Result};
use crate::format::FormatConfig;
use crate::imports::{self, ImportRequest, BASE_DEFAULT, BASE_MODULE, PROP_TYPE};

/// Lines longer than this break their innermost object.
const PRINT_WIDTH: usize = 80;

/// Piece of the synthesized object literal.
enum Node {
    /// Verbatim source text. Lines after the first are relative to the entry's indentation.
    Text(String),
    Object(Vec<Member>),
}

enum Value {
    /// The head is the whole entry, copied from the class.
    Verbatim,
    Node(Node),
    /// `data() { return <object>; }`
    Factory(Node),
}

struct Member {
    docs: Vec<String>,
    head: String,
    value: Value,
}

impl Member {
    fn entry(head: impl Into<String>, value: Node) -> Self {
        Self {
            docs: Vec::new(),
            head: head.into(),
            value: Value::Node(value),
        }
    }

    fn verbatim(text: impl Into<String>) -> Self {
        Self {
            docs: Vec::new(),
            head: text.into(),
            value: Value::Verbatim,
        }
    }
}

/// Indents every line after the first by `indent`, leaving empty lines empty.
fn reindent(text: &str, indent: &str) -> String {
    let mut lines = text.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(indent);
        }
        out.push_str(line);
    }
    out
}

/// Builds the text of the `extend` call that replaces a class component.
///
/// Objects stay on one line when they fit and carry no docs, and break one
/// entry per line otherwise. `data()` always breaks.
pub struct ExtendBuilder<'a> {
    format: &'a FormatConfig,
    /// Local name of the base framework's default import.
    factory: &'a str,
    /// Local name of the generic type-tag helper.
    prop_type: &'a str,
}

impl<'a> ExtendBuilder<'a> {
    pub fn new(format: &'a FormatConfig, factory: &'a str, prop_type: &'a str) -> Self {
        Self {
            format,
            factory,
            prop_type,
        }
    }

    fn braces(&self, inner: &str) -> String {
        if self.format.bracket_spacing {
            format!("{{ {inner} }}")
        } else {
            format!("{{{inner}}}")
        }
    }

    /// One-line rendering, if the node has one.
    fn flat(&self, node: &Node) -> Option<String> {
        match node {
            Node::Text(text) if text.contains('\n') => None,
            Node::Text(text) => Some(text.clone()),
            Node::Object(members) if members.is_empty() => Some("{}".to_string()),
            Node::Object(members) => {
                let mut entries = Vec::with_capacity(members.len());
                for member in members {
                    if !member.docs.is_empty() {
                        return None;
                    }
                    entries.push(match &member.value {
                        Value::Verbatim if member.head.contains('\n') => return None,
                        Value::Verbatim => member.head.clone(),
                        Value::Node(value) => format!("{}{}", member.head, self.flat(value)?),
                        Value::Factory(_) => return None,
                    });
                }
                Some(self.braces(&entries.join(", ")))
            }
        }
    }

    /// Renders `node` starting at `column` on a line indented `depth` levels.
    /// `suffix` is the width of whatever closes the line after it.
    fn node(&self, node: &Node, depth: usize, column: usize, suffix: usize) -> String {
        if let Some(flat) = self.flat(node) {
            if column + flat.len() + suffix <= PRINT_WIDTH {
                return flat;
            }
        }

        match node {
            Node::Text(text) => reindent(text, &self.format.indent_at(depth)),
            Node::Object(members) if members.is_empty() => "{}".to_string(),
            Node::Object(members) => {
                let mut out = String::from("{\n");
                let last = members.len() - 1;
                for (index, member) in members.iter().enumerate() {
                    out.push_str(&self.member(member, depth + 1));
                    if index != last || self.format.trailing_commas {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&self.format.indent_at(depth));
                out.push('}');
                out
            }
        }
    }

    /// Renders one broken-out entry, docs included, without the separating comma.
    fn member(&self, member: &Member, depth: usize) -> String {
        let indent = self.format.indent_at(depth);
        let mut out = String::new();
        if let Some(comment) = docs::render(&member.docs, &indent, "\n") {
            out.push_str(&comment);
            out.push('\n');
        }
        out.push_str(&indent);

        let column = self.format.indent.width() * depth + member.head.len();
        match &member.value {
            Value::Verbatim => out.push_str(&reindent(&member.head, &indent)),
            Value::Node(value) => {
                out.push_str(&member.head);
                out.push_str(&self.node(value, depth, column, 1));
            }
            Value::Factory(value) => {
                let inner = self.format.indent_at(depth + 1);
                let column = self.format.indent.width() * (depth + 1) + "return ".len();
                out.push_str(&member.head);
                out.push_str("{\n");
                out.push_str(&inner);
                out.push_str("return ");
                out.push_str(&self.node(value, depth + 1, column, 1));
                out.push_str(";\n");
                out.push_str(&indent);
                out.push('}');
            }
        }
        out
    }

    fn prop_member(&self, field: &InputField) -> Member {
        let mut options = Vec::with_capacity(2);
        if let Some(tag) = &field.type_tag {
            options.push(Member::entry("type: ", Node::Text(tag.render(self.prop_type))));
        }
        options.push(match field.requiredness() {
            Requiredness::Default(entry) | Requiredness::Required(entry) => Member::verbatim(entry),
            Requiredness::Optional => Member::verbatim("required: false"),
        });

        Member {
            docs: field.docs.clone(),
            ..Member::entry(format!("{}: ", field.key), Node::Object(options))
        }
    }

    fn state_member(field: &StateField) -> Member {
        let value = match (&field.declared_type, field.needs_parens) {
            (Some(ty), true) => format!("({}) as {ty}", field.initializer),
            (Some(ty), false) => format!("{} as {ty}", field.initializer),
            (None, _) => field.initializer.clone(),
        };
        Member {
            docs: field.docs.clone(),
            ..Member::entry(format!("{}: ", field.key), Node::Text(value))
        }
    }

    fn object(&self, ir: &ComponentIr) -> Node {
        let mut members = Vec::new();
        if let Some(name) = &ir.name {
            members.push(Member::entry("name: ", Node::Text(self.format.string_literal(name))));
        }
        for entry in ir.config.iter().flatten() {
            members.push(Member::verbatim(entry.text.as_str()));
        }
        if !ir.input_fields.is_empty() {
            let props = ir.input_fields.iter().map(|field| self.prop_member(field)).collect();
            members.push(Member::entry("props: ", Node::Object(props)));
        }
        if !ir.state_fields.is_empty() {
            let state = ir.state_fields.iter().map(Self::state_member).collect();
            members.push(Member {
                docs: Vec::new(),
                head: "data() ".to_string(),
                value: Value::Factory(Node::Object(state)),
            });
        }
        Node::Object(members)
    }

    /// Default-export statement for `ir`, preceded by the component docs.
    ///
    /// Lines end in `\n`; the printer applies the configured newline.
    pub fn render(self, ir: &ComponentIr) -> String {
        let mut out = String::new();
        if let Some(comment) = docs::render(&ir.docs, "", "\n") {
            out.push_str(&comment);
            out.push('\n');
        }
        let head = format!("export default {}.extend(", self.factory);
        out.push_str(&head);
        out.push_str(&self.node(&self.object(ir), 0, head.len(), 2));
        out.push_str(");\n");
        out
    }
}

/// Replaces the class component described by `ir` with an `extend` call.
pub fn synthesize(doc: &mut Document, ir: &ComponentIr, format: &FormatConfig) -> Result<()> {
    let named: &[&str] = if ir.needs_prop_type() { &[PROP_TYPE] } else { &[] };
    let bindings = imports::ensure(
        doc,
        BASE_MODULE,
        &ImportRequest {
            default: Some(BASE_DEFAULT),
            named,
        },
    )?;
    let factory = bindings.default.as_deref().unwrap_or(BASE_DEFAULT);
    let prop_type = bindings.named.first().map_or(PROP_TYPE, String::as_str);

    let text = ExtendBuilder::new(format, factory, prop_type).render(ir);
    let items = doc.parse_items(&text)?;

    let index = doc
        .position_of(ir.item_span)
        .ok_or_else(|| Error::MissingDeclaration {
            name: ir.display_name().to_string(),
        })?;

    // Comments still in front of the class, such as a file header, stay in front.
    let old = full_span(&doc.module.body[index]);
    if let (Some(first), Some(last)) = (items.first(), items.last()) {
        let mut kept = doc.take_leading_comments(old.lo);
        if ir.item_span.lo != old.lo {
            kept.extend(doc.take_leading_comments(ir.item_span.lo));
        }
        doc.prepend_leading_comments(full_span(first).lo, kept);
        doc.move_trailing_comments(old.hi, last.span().hi);
    }
    doc.module.body.splice(index..=index, items);

    debug!(component = ir.display_name(), factory, "replaced class component");
    Ok(())
}

#[cfg(test)]
mod tests {
    use swc_common::DUMMY_SP;

    use super::*;
    use crate::format::Indent;

    fn widget() -> ComponentIr {
        ComponentIr {
            item_span: DUMMY_SP,
            docs: vec!["A widget.".to_string()],
            name: Some("Widget".to_string()),
            config: Some(vec![ConfigEntry {
                key: Some("components".to_string()),
                text: "components: { Other }".to_string(),
            }]),
            input_fields: vec![
                InputField {
                    key: "label".to_string(),
                    declared_type: Some("string".to_string()),
                    type_tag: Some(TypeTag::Primitive(Primitive::String)),
                    docs: vec!["Shown on the button.".to_string()],
                    default_entry: None,
                    required_entry: Some("required: true".to_string()),
                },
                InputField {
                    key: "items".to_string(),
                    declared_type: Some("Item[]".to_string()),
                    type_tag: Some(TypeTag::Other("Item[]".to_string())),
                    docs: Vec::new(),
                    default_entry: Some("default: () => []".to_string()),
                    required_entry: None,
                },
            ],
            state_fields: vec![
                StateField {
                    key: "open".to_string(),
                    initializer: "false".to_string(),
                    needs_parens: false,
                    declared_type: Some("boolean".to_string()),
                    docs: vec!["Whether the menu is open.".to_string(), "Toggled on click.".to_string()],
                },
                StateField {
                    key: "offset".to_string(),
                    initializer: "-1".to_string(),
                    needs_parens: true,
                    declared_type: Some("number".to_string()),
                    docs: Vec::new(),
                },
            ],
        }
    }

    fn bare(ir: ComponentIr) -> ComponentIr {
        ComponentIr {
            docs: Vec::new(),
            config: None,
            input_fields: Vec::new(),
            state_fields: Vec::new(),
            ..ir
        }
    }

    #[test]
    fn renders_full_component() {
        let format = FormatConfig::default();
        let text = ExtendBuilder::new(&format, "Vue", "PropType").render(&widget());

        insta::assert_snapshot!(text.trim_end(), @r"
        /** A widget. */
        export default Vue.extend({
          name: 'Widget',
          components: { Other },
          props: {
            /** Shown on the button. */
            label: { type: String, required: true },
            items: { type: Object as PropType<Item[]>, default: () => [] }
          },
          data() {
            return {
              /**
               * Whether the menu is open.
               * Toggled on click.
               */
              open: false as boolean,
              offset: (-1) as number
            };
          }
        });
        ");
    }

    #[test]
    fn small_component_stays_on_one_line() {
        let format = FormatConfig::default();
        let ir = ComponentIr {
            config: widget().config,
            ..bare(widget())
        };

        let text = ExtendBuilder::new(&format, "Vue", "PropType").render(&ir);
        assert_eq!(text, "export default Vue.extend({ name: 'Widget', components: { Other } });\n");
    }

    #[test]
    fn empty_anonymous_component() {
        let format = FormatConfig::default();
        let ir = ComponentIr {
            name: None,
            ..bare(widget())
        };

        let text = ExtendBuilder::new(&format, "V", "PropType").render(&ir);
        assert_eq!(text, "export default V.extend({});\n");
    }

    #[test]
    fn untyped_optional_prop() {
        let format = FormatConfig::default();
        let builder = ExtendBuilder::new(&format, "Vue", "PropType");
        let field = InputField {
            key: "value".to_string(),
            declared_type: None,
            type_tag: None,
            docs: Vec::new(),
            default_entry: None,
            required_entry: None,
        };

        assert_eq!(
            builder.member(&builder.prop_member(&field), 2),
            "    value: { required: false }"
        );
    }

    #[test]
    fn long_and_multi_line_values_break() {
        let format = FormatConfig::default();
        let ir = ComponentIr {
            input_fields: vec![InputField {
                key: "placeholder".to_string(),
                declared_type: Some("string".to_string()),
                type_tag: Some(TypeTag::Primitive(Primitive::String)),
                docs: Vec::new(),
                default_entry: Some("default: 'Type something here to search the whole catalogue'".to_string()),
                required_entry: None,
            }],
            state_fields: vec![StateField {
                key: "rows".to_string(),
                initializer: "[\n  1,\n  2,\n]".to_string(),
                needs_parens: false,
                declared_type: None,
                docs: Vec::new(),
            }],
            ..bare(widget())
        };

        let text = ExtendBuilder::new(&format, "Vue", "PropType").render(&ir);
        insta::assert_snapshot!(text.trim_end(), @r"
        export default Vue.extend({
          name: 'Widget',
          props: {
            placeholder: {
              type: String,
              default: 'Type something here to search the whole catalogue'
            }
          },
          data() {
            return {
              rows: [
                1,
                2,
              ]
            };
          }
        });
        ");
    }

    #[test]
    fn honours_indent_commas_and_brace_padding() {
        let format = FormatConfig {
            indent: Indent::Tab,
            trailing_commas: true,
            bracket_spacing: false,
            ..FormatConfig::default()
        };
        let ir = ComponentIr {
            input_fields: vec![InputField {
                docs: Vec::new(),
                ..widget().input_fields.remove(0)
            }],
            state_fields: vec![widget().state_fields.remove(1)],
            ..bare(widget())
        };

        let text = ExtendBuilder::new(&format, "Vue", "PropType").render(&ir);
        assert_eq!(
            text,
            "export default Vue.extend({\n\
             \tname: 'Widget',\n\
             \tprops: {label: {type: String, required: true}},\n\
             \tdata() {\n\
             \t\treturn {offset: (-1) as number};\n\
             \t},\n\
             });\n"
        );
    }

    #[test]
    fn synthesize_replaces_the_class() {
        let mut doc = Document::parse(
            "Widget.ts",
            "import Vue from 'vue';\n\n// header\nexport default class Widget extends Vue {}\n",
        )
        .unwrap();
        let ir = ComponentIr {
            item_span: swc_common::Spanned::span(&doc.module.body[1]),
            docs: vec!["A widget.".to_string()],
            ..bare(widget())
        };

        synthesize(&mut doc, &ir, &FormatConfig::default()).unwrap();

        assert_eq!(doc.module.body.len(), 2);
        let printed = doc.print(&FormatConfig::default()).unwrap();
        assert_eq!(
            printed,
            "import Vue from 'vue';\n\n// header\n/** A widget. */\nexport default Vue.extend({ name: 'Widget' });\n"
        );
    }

    #[test]
    fn missing_declaration_is_an_error() {
        let mut doc = Document::parse("Widget.ts", "const a = 1;").unwrap();
        let err = synthesize(&mut doc, &widget(), &FormatConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingDeclaration { .. }));
    }
}
