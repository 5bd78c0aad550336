use std::fmt;

use serde::Serialize;

/// Errors that abort the transform of one file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input (or a synthesized fragment of it) is not valid TypeScript.
    #[error("failed to parse `{file}` at {line}:{column}: {message}")]
    Parse {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// The component decorator was called with something other than an object literal.
    #[error("malformed component configuration on `{class}`: expected an object literal")]
    MalformedConfig { class: String },

    /// The input-field decorator was called with something other than an object literal.
    #[error("malformed input-field options on `{field}`: expected an object literal")]
    MalformedPropOptions { field: String },

    #[error("no source text for span {lo}..{hi}")]
    Snippet { lo: u32, hi: u32 },

    /// The component declaration disappeared between extraction and synthesis.
    #[error("component declaration `{name}` is no longer in the module")]
    MissingDeclaration { name: String },

    /// Synthesized code parsed, but not into the expected shape.
    #[error("unexpected synthesized code: {0}")]
    Synthesis(String),

    #[error("unsupported format option: {0}")]
    UnsupportedFormat(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Findings that do not stop the transform but that a host may want to surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Only the first decorated class of a file is converted.
    MultipleComponents { skipped: Vec<String> },

    /// A field with neither the input-field decorator nor an initializer.
    SkippedField { field: String },

    /// A class member the object style cannot express; it is dropped with the class.
    UnsupportedMember { member: String },

    /// The decorator configuration already carries a key the transform synthesizes.
    /// Both entries are emitted in the fixed order `name`, configuration, `props`, `data`;
    /// the later one wins at runtime.
    KeyCollision { key: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MultipleComponents { skipped } => write!(
                f,
                "only the first component is converted, left untouched: {}",
                skipped.join(", ")
            ),
            Warning::SkippedField { field } => {
                write!(f, "field `{field}` has no decorator and no initializer, skipped")
            }
            Warning::UnsupportedMember { member } => {
                write!(f, "member `{member}` cannot be converted and is dropped")
            }
            Warning::KeyCollision { key } => write!(
                f,
                "component configuration already defines `{key}`, both entries are emitted"
            ),
        }
    }
}

/// Records a warning and logs it.
pub(crate) fn report(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!("{warning}");
    warnings.push(warning);
}
