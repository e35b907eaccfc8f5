//! # idOS Testkit
//!
//! Testing utilities for the idOS crates.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Known-answer vectors**: Fixed inputs with expected digests and addresses per chain
//! - **Generators**: Proptest strategies for addresses, grants and plaintexts
//! - **Fixtures**: Deterministic parties with an encryption key pair and a wallet per chain,
//!   a registry that knows their NEAR keys, and stored credentials
//!
//! ## Known-Answer Vectors
//!
//! ```rust
//! use idos_testkit::vectors::evm_address_vectors;
//!
//! for vector in evm_address_vectors() {
//!     println!("{}: {}", vector.secret_hex, vector.address);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use idos_testkit::generators::any_address;
//!
//! proptest! {
//!     #[test]
//!     fn classified(address in any_address()) {
//!         prop_assert!(idos_core::classify(&address).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use idos_core::ChainTag;
//! use idos_testkit::fixtures::Party;
//!
//! let alice = Party::new(1);
//! let signer = alice.signer(ChainTag::Near);
//! assert_eq!(signer.address(), "party-1.testnet");
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{near_keys, parties, registry_for, sealed_credential, stored_credentials, Party};

/// Install a test subscriber that honours `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
