//! Errors raised while resolving specialization

use thiserror::Error;

/// Errors from BSM resolution
#[derive(Error, Debug)]
pub enum BsmError {
    /// Row is missing its module
    #[error("no module defined at row {row}")]
    MissingModule { row: usize },

    /// Row failed structural validation
    #[error("invalid row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    /// Class row with an empty class term
    #[error("invalid row {row}: no class term defined")]
    MissingClassTerm { row: usize },

    /// Property attached to an unregistered class
    #[error("class '{class_term}' is not registered")]
    UnregisteredClass { class_term: String },

    /// Sequence column does not parse as an integer
    #[error("invalid sequence value '{sequence}' in row with id {id}")]
    InvalidSequence { sequence: String, id: String },

    /// Module-code table could not be read
    #[error("module-code table {path}: {message}")]
    ModuleTable { path: String, message: String },
}

impl BsmError {
    pub fn invalid_row(row: usize, message: impl Into<String>) -> Self {
        Self::InvalidRow {
            row,
            message: message.into(),
        }
    }

    pub fn module_table(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModuleTable {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for BSM resolution
pub type BsmResult<T> = std::result::Result<T, BsmError>;
