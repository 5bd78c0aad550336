pub mod extend;

pub use extend::{synthesize, ExtendBuilder};
