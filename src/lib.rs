//! Rewrites a decorator-based Vue class component into a `Vue.extend` object component.
//!
//! ```text
//! @Component({ components: { Other } })        export default Vue.extend({
//! export default class Widget extends Vue {      name: 'Widget',
//!   @Prop() label!: string;              =>      components: { Other },
//!   open = false;                                props: { label: { type: String, required: false } },
//! }                                              data() {
//!                                                  return { open: false };
//!                                                }
//!                                              });
//! ```
//!
//! One file at a time, fully in memory. Reading and writing files is the host's job.

use serde::Serialize;
use swc_common::{Globals, GLOBALS};
use tracing::debug;

pub mod component;
pub mod docs;
pub mod document;
pub mod error;
pub mod extractors;
pub mod format;
pub mod generators;
pub mod imports;

pub use component::ComponentIr;
pub use document::Document;
pub use error::{Error, Result, Warning};
pub use format::{FormatConfig, Indent, NewLine, QuoteStyle};

use extractors::{ClassExtractor, DecoratorNames};

/// Result of transforming one file.
#[derive(Debug, Clone, Serialize)]
pub struct TransformOutput {
    pub code: String,
    /// `false` means `code` is the input, byte for byte.
    pub changed: bool,
    /// Name of the converted class, if one was found and named.
    pub component: Option<String>,
    pub warnings: Vec<Warning>,
}

/// Transforms the source text of one file.
///
/// `file_name` only labels diagnostics.
pub fn transform_source(file_name: &str, source: &str, format: &FormatConfig) -> Result<TransformOutput> {
    format.validate()?;
    GLOBALS.set(&Globals::new(), || transform(file_name, source, format))
}

fn transform(file_name: &str, source: &str, format: &FormatConfig) -> Result<TransformOutput> {
    let mut doc = Document::parse(file_name, source)?.with_format(*format);
    let mut warnings = Vec::new();

    let names = DecoratorNames::resolve(&doc.module);
    let ir = ClassExtractor::new(&doc, &names, &mut warnings).extract()?;
    let collapsed = imports::collapse_decorator_imports(&mut doc)?;

    if ir.is_none() && !collapsed {
        debug!(file = file_name, "no class component, leaving file untouched");
        return Ok(TransformOutput {
            code: source.to_string(),
            changed: false,
            component: None,
            warnings,
        });
    }

    if let Some(ir) = &ir {
        generators::synthesize(&mut doc, ir, format)?;
    }

    Ok(TransformOutput {
        code: doc.print(format)?,
        changed: true,
        component: ir.and_then(|ir| ir.name),
        warnings,
    })
}
