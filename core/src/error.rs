use rust_decimal::Decimal;
use thiserror::Error;

/// Pixcode error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid amount: {0} (minimum is 0.01)")]
    InvalidAmount(Decimal),

    #[error("Field {tag} value is {length} characters long (max 99)")]
    FieldLengthExceeded { tag: String, length: usize },

    #[error("QR encoding failed: {0}")]
    QrEncoding(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Invalid merchant profile: {0}")]
    InvalidProfile(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Failed to serialize/deserialize: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
