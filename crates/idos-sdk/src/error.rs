//! Error types for the client.

use idos_core::{ChainTag, CoreError, DecodeError, UnsupportedAddressError};
use idos_perms::PermsError;
use idos_signer::SignerError;
use idos_store::StoreError;
use thiserror::Error;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    UnsupportedAddress(#[from] UnsupportedAddressError),

    #[error("encryption error: {0}")]
    Perms(#[from] PermsError),

    #[error("signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The caller holds no grant for this credential that is usable now.
    #[error("no usable grant on credential {credential_id} for {grantee}")]
    NoUsableGrant {
        credential_id: String,
        grantee: String,
    },

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// The signer reports a chain that its own address does not belong to.
    #[error("signer for {address} claims chain {declared} but the address is {detected}")]
    SignerMismatch {
        address: String,
        declared: ChainTag,
        detected: ChainTag,
    },

    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    #[error("grant not found: {0}")]
    GrantNotFound(String),

    /// The sealed content does not open with the session's key.
    #[error("credential {0} cannot be decrypted with this session's key")]
    NotDecryptable(String),

    /// A wallet's ownership proof is missing or does not verify.
    #[error("invalid wallet proof for {0}")]
    InvalidWallet(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
