use thiserror::Error;

/// Main error type for teleinfo operations
#[derive(Error, Debug)]
pub enum TicError {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for teleinfo operations
pub type TicResult<T> = Result<T, TicError>;
