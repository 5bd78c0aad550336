pub mod class;
pub mod decorators;

pub use class::ClassExtractor;
pub use decorators::DecoratorNames;
