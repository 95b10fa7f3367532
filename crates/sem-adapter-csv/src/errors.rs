//! Error types for the CSV adapters with row context

use thiserror::Error;

/// Errors that can occur when working with the CSV artifacts
#[derive(Error, Debug, Clone)]
pub enum CsvError {
    /// CSV read error with context
    #[error("CSV read error at line {line}: {message}")]
    Read { line: usize, message: String },

    /// CSV write error
    #[error("CSV write error: {0}")]
    Write(String),

    /// A required header column is absent
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    /// Field conversion error with context
    #[error("Conversion error at line {line}, column '{column}': {message}")]
    Conversion {
        line: usize,
        column: String,
        message: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    Io(String),
}

impl CsvError {
    /// Create a read error at a specific line
    pub fn read_at(line: usize, message: impl Into<String>) -> Self {
        Self::Read {
            line,
            message: message.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(line: usize, column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            line,
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a missing-column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Create a write error
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    /// Get the line number if available
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::Read { line, .. } => Some(*line),
            Self::Conversion { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CsvError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Result type alias for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;
