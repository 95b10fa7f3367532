//! Foundational Semantic Model builder.
//!
//! Ingests BIE definition rows in two passes. Pass 1 normalizes rows,
//! assigns identifiers, and registers every class so forward
//! references resolve. Pass 2 derives abstract superclasses from
//! qualifier chains, pools their properties, prunes pools below the
//! sharing threshold, normalizes association targets, and flattens the
//! model into an ordered row list with inheritance status tags.

pub mod builder;
pub mod error;
pub mod flatten;
pub mod validate;

pub use builder::{FsmBuilder, FsmConfig};
pub use error::{FsmError, FsmResult};
