//! Specialization resolver.
//!
//! Consumes one or more flattened FSM row sets (a base model plus
//! optional extensions) and produces the Business Semantic Model:
//! module-tagged terms, per-module identifier reassignment, inherited
//! properties inlined with override and delete semantics, abstract
//! classes excluded, and rows sorted canonically.

pub mod error;
pub mod modules;
pub mod resolver;

pub use error::{BsmError, BsmResult};
pub use modules::ModuleCodes;
pub use resolver::SpecializationResolver;
