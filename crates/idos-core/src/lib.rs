//! # idOS Core
//!
//! Pure primitives for the idOS kernel: canonical encodings, wallet address
//! classification, and the record shapes exchanged with the store.
//!
//! This crate contains no I/O, no storage, no networking, and no key material.
//!
//! ## Key Types
//!
//! - [`ChainTag`] - Which ledger an address belongs to (evm, near, xrpl, stellar)
//! - [`Credential`] - An encrypted credential record
//! - [`Grant`] - An access grant, optionally time-locked
//! - [`Wallet`] - A wallet record with optional ownership proof
//!
//! ## Codecs
//!
//! All byte/text transforms live in the [`codec`] module. Decoders reject
//! malformed input with [`DecodeError`] instead of truncating.

pub mod chain;
pub mod codec;
pub mod error;
pub mod types;

pub use chain::{classify, normalize_address, ChainTag, CLASSIFICATION_ORDER};
pub use codec::{content_hash, HexCase};
pub use error::{CoreError, DecodeError, Result, UnsupportedAddressError};
pub use types::{Credential, Grant, Wallet};
