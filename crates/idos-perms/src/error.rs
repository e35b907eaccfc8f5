//! Error types for the permissions module.

use idos_core::DecodeError;
use thiserror::Error;

/// Errors that can occur during sealing and grant operations.
///
/// A message that fails to authenticate is not an error; see
/// [`crate::envelope::open`].
#[derive(Debug, Error)]
pub enum PermsError {
    /// Malformed textual encoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Key material has the wrong shape.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Encryption error.
    #[error("encryption error: {0}")]
    EncryptionError(String),

    /// Invalid lock display configuration.
    #[error("invalid lock display format: {0}")]
    InvalidLockFormat(String),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
