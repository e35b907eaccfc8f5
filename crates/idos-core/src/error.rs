//! Error types for the idOS core.

use thiserror::Error;

/// A textual or binary encoding could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid utf-8: {0}")]
    InvalidUtf8(String),

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// An address matched none of the known chain formats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported address: {0:?}")]
pub struct UnsupportedAddressError(pub String);

/// Errors surfaced by core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    UnsupportedAddress(#[from] UnsupportedAddressError),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
