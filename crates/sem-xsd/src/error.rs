//! Errors raised while emitting a schema module

use thiserror::Error;

/// Errors from XSD emission
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XsdError {
    /// The hierarchical model holds no nodes
    #[error("hierarchical model is empty, nothing to emit")]
    EmptyModel,

    /// The first node is not a class at level 1
    #[error("hierarchical model does not start with a root class (found level {level})")]
    MissingRoot { level: u8 },
}

/// Result type alias for XSD emission
pub type XsdResult<T> = std::result::Result<T, XsdError>;
