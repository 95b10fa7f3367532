//! Class registry for the semantic-model compiler.
//!
//! A registry owns the canonical `ClassRecord` for every class term
//! seen during a pipeline stage. Property maps are insertion-ordered
//! because declaration order is semantic in the flattened artifacts.
//! Cross-references between classes are by class-term string; lookups
//! hand out references or clones, never shared ownership.

pub mod chain;
pub mod record;
pub mod registry;

pub use chain::{superclass_chain, SuperclassChain};
pub use record::{ClassRecord, PropertyRecord};
pub use registry::ClassRegistry;
