use swc_common::Span;
use swc_ecma_ast::{TsKeywordTypeKind, TsType};

/// A decorated class component, as extracted from one file.
///
/// Expressions and types are kept as their verbatim source text; they are
/// reparsed when the replacement is spliced in.
#[derive(Clone, Debug)]
pub struct ComponentIr {
    /// Span of the top-level item holding the class.
    pub item_span: Span,
    /// Leading comments of the class, followed by body comments that belong to no entry.
    pub docs: Vec<String>,
    /// Class identifier, absent for `export default class extends Vue`.
    pub name: Option<String>,
    /// Properties of the decorator's object-literal argument, in source order.
    pub config: Option<Vec<ConfigEntry>>,
    pub input_fields: Vec<InputField>,
    pub state_fields: Vec<StateField>,
}

impl ComponentIr {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    /// Whether any input field needs the generic type-tag helper.
    pub fn needs_prop_type(&self) -> bool {
        self.input_fields
            .iter()
            .any(|field| matches!(field.type_tag, Some(TypeTag::Other(_))))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Static key, absent for spreads and computed keys.
    pub key: Option<String>,
    pub text: String,
}

/// A field marked with the input-field decorator.
#[derive(Clone, Debug)]
pub struct InputField {
    /// Key as written, quotes included for string keys.
    pub key: String,
    pub declared_type: Option<String>,
    pub type_tag: Option<TypeTag>,
    pub docs: Vec<String>,
    /// Complete `default` entry of the decorator options, e.g. `default: () => []`.
    pub default_entry: Option<String>,
    /// Complete `required` entry of the decorator options.
    pub required_entry: Option<String>,
}

impl InputField {
    /// A supplied default means the field is not mandatory, so it hides `required`.
    pub fn requiredness(&self) -> Requiredness<'_> {
        match (&self.default_entry, &self.required_entry) {
            (Some(entry), _) => Requiredness::Default(entry),
            (None, Some(entry)) => Requiredness::Required(entry),
            (None, None) => Requiredness::Optional,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requiredness<'a> {
    Default(&'a str),
    Required(&'a str),
    Optional,
}

/// A field with an initializer and no input-field decorator.
#[derive(Clone, Debug)]
pub struct StateField {
    pub key: String,
    pub initializer: String,
    /// The initializer must be parenthesized before a type assertion is applied.
    pub needs_parens: bool,
    pub declared_type: Option<String>,
    pub docs: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
}

impl Primitive {
    /// Runtime wrapper constructor used as the type tag.
    pub fn wrapper(self) -> &'static str {
        match self {
            Primitive::String => "String",
            Primitive::Number => "Number",
            Primitive::Boolean => "Boolean",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeTag {
    Primitive(Primitive),
    /// Any other declared type, kept verbatim for the generic cast form.
    Other(String),
}

impl TypeTag {
    pub fn classify(ty: &TsType, text: &str) -> Self {
        if let TsType::TsKeywordType(keyword) = ty {
            match keyword.kind {
                TsKeywordTypeKind::TsStringKeyword => return TypeTag::Primitive(Primitive::String),
                TsKeywordTypeKind::TsNumberKeyword => return TypeTag::Primitive(Primitive::Number),
                TsKeywordTypeKind::TsBooleanKeyword => return TypeTag::Primitive(Primitive::Boolean),
                _ => {}
            }
        }
        TypeTag::Other(text.to_string())
    }

    /// Expression text of the tag; `prop_type` is the local name of the generic helper.
    pub fn render(&self, prop_type: &str) -> String {
        match self {
            TypeTag::Primitive(primitive) => primitive.wrapper().to_string(),
            TypeTag::Other(text) => format!("Object as {prop_type}<{text}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(default_entry: Option<&str>, required_entry: Option<&str>) -> InputField {
        InputField {
            key: "label".to_string(),
            declared_type: Some("string".to_string()),
            type_tag: Some(TypeTag::Primitive(Primitive::String)),
            docs: Vec::new(),
            default_entry: default_entry.map(str::to_string),
            required_entry: required_entry.map(str::to_string),
        }
    }

    #[test]
    fn default_hides_required() {
        let both = field(Some("default: 'x'"), Some("required: true"));
        assert_eq!(both.requiredness(), Requiredness::Default("default: 'x'"));

        let required = field(None, Some("required: true"));
        assert_eq!(required.requiredness(), Requiredness::Required("required: true"));

        assert_eq!(field(None, None).requiredness(), Requiredness::Optional);
    }

    #[test]
    fn tags_render() {
        assert_eq!(TypeTag::Primitive(Primitive::Boolean).render("PropType"), "Boolean");
        assert_eq!(
            TypeTag::Other("Item[]".to_string()).render("PropType"),
            "Object as PropType<Item[]>"
        );
    }
}
