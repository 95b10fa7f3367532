//! Errors raised while building the FSM

use thiserror::Error;

/// Errors from BIE ingestion and FSM flattening
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FsmError {
    /// Row failed structural validation
    #[error("invalid row {sequence}: {message}")]
    InvalidRow { sequence: String, message: String },

    /// Association target resolves to no registered class
    #[error("associated class '{associated_class}' of '{class_term}' is not registered")]
    UnresolvedAssociation {
        class_term: String,
        associated_class: String,
    },
}

impl FsmError {
    pub fn invalid_row(sequence: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRow {
            sequence: sequence.into(),
            message: message.into(),
        }
    }

    pub fn unresolved(
        class_term: impl Into<String>,
        associated_class: impl Into<String>,
    ) -> Self {
        Self::UnresolvedAssociation {
            class_term: class_term.into(),
            associated_class: associated_class.into(),
        }
    }
}

/// Result type alias for FSM building
pub type FsmResult<T> = std::result::Result<T, FsmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = FsmError::invalid_row("42", "Multiplicity '7' is not valid.");
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("Multiplicity"));

        let err = FsmError::unresolved("Invoice", "Ghost Class");
        assert!(err.to_string().contains("Ghost Class"));
        assert!(err.to_string().contains("Invoice"));
    }
}
