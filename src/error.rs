//! Error type shared by the library and its host binaries

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanError {
    /// Input a validating caller should never produce (e.g. a negative term)
    #[error("invalid loan input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, LoanError>;
