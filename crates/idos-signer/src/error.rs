//! Error types for wallet signers.

use thiserror::Error;

use idos_core::UnsupportedAddressError;

/// Errors that can occur when building signers or producing signatures.
///
/// Verification never returns these: a signature that cannot be checked is
/// simply not valid.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("no verifier registered for chain: {0}")]
    UnsupportedChain(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Address(#[from] UnsupportedAddressError),
}

/// Result type for signer operations.
pub type Result<T> = std::result::Result<T, SignerError>;
