//! # idOS SDK
//!
//! The client API for the idOS credential exchange: encrypted credentials,
//! time-locked access grants, and wallet linking across EVM, NEAR, XRPL and
//! Stellar.
//!
//! ## Overview
//!
//! - **Issuers** seal credentials for their owners
//! - **Owners** reseal a credential for a grantee and record a grant for it
//! - **Grantees** decrypt shared copies while they hold a usable grant
//! - **Wallets** are linked to a human by a signed message, checked per chain
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use idos_sdk::{Client, ClientConfig, Issuer, Session};
//! use idos_sdk::perms::BoxKeyPair;
//! use idos_sdk::signer::EvmSigner;
//! use idos_sdk::store::MemoryStore;
//!
//! async fn example() {
//!     let store = Arc::new(MemoryStore::new());
//!
//!     let owner = Session::new(Arc::new(EvmSigner::generate()), BoxKeyPair::generate()).unwrap();
//!     let issuer = Issuer::new("issuer-1", BoxKeyPair::generate(), store.clone());
//!     let credential = issuer
//!         .issue_credential("human-1", &owner.encryption_public_key(), b"hello", None)
//!         .await
//!         .unwrap();
//!
//!     let client = Client::with_shared_store(owner, store, ClientConfig::default());
//!     let plaintext = client.decrypt_own(&credential.id).await.unwrap();
//!     assert_eq!(plaintext, b"hello");
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `idos_sdk::core` - Record shapes, chain classification, codecs
//! - `idos_sdk::perms` - Sealed envelopes and grant evaluation
//! - `idos_sdk::signer` - Per-chain signers and verifiers
//! - `idos_sdk::store` - Storage abstraction and SQLite

pub mod client;
pub mod error;
pub mod issuer;
pub mod session;

pub use idos_core as core;
pub use idos_perms as perms;
pub use idos_signer as signer;
pub use idos_store as store;

pub use client::{BatchItem, Client, ClientConfig, DecryptOutcome, SharedCredential};
pub use error::{ClientError, Result};
pub use issuer::Issuer;
pub use session::Session;

pub use idos_core::{ChainTag, Credential, Grant, Wallet};

/// Current unix time in seconds, for grant evaluation.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
