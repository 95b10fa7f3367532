//! Errors raised during the graph walk

use thiserror::Error;

/// Errors from hierarchical-model construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LhmError {
    /// Property row names a class that was never registered
    #[error("class '{class_term}' is not defined in the model")]
    UndefinedClass { class_term: String },

    /// Class term failed every resolution fallback
    #[error("'{resolved}' from '{class_term}' resolves to no registered class")]
    UnresolvedClass {
        class_term: String,
        resolved: String,
    },

    /// None of the requested root class terms exist in the model
    #[error("root class {roots:?} not found in the model")]
    RootNotFound { roots: Vec<String> },
}

impl LhmError {
    pub fn undefined_class(class_term: impl Into<String>) -> Self {
        Self::UndefinedClass {
            class_term: class_term.into(),
        }
    }

    pub fn unresolved(class_term: impl Into<String>, resolved: impl Into<String>) -> Self {
        Self::UnresolvedClass {
            class_term: class_term.into(),
            resolved: resolved.into(),
        }
    }

    pub fn root_not_found(roots: &[String]) -> Self {
        Self::RootNotFound {
            roots: roots.to_vec(),
        }
    }
}

/// Result type alias for the graph walk
pub type LhmResult<T> = std::result::Result<T, LhmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = LhmError::unresolved("GEN_ Ledger", "GEN:Ledger");
        assert!(err.to_string().contains("GEN_ Ledger"));
        assert!(err.to_string().contains("GEN:Ledger"));

        let err = LhmError::root_not_found(&["Accounting Entries".to_string()]);
        assert!(err.to_string().contains("Accounting Entries"));
    }
}
