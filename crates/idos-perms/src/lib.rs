//! # idOS Permissions
//!
//! Encrypted credential exchange and time-locked grants.
//!
//! ## Overview
//!
//! Credential content is sealed with an authenticated public-key box
//! (curve25519-xsalsa20-poly1305) between a sender key pair and a recipient
//! key pair. Access to a shared copy is governed by a [`Grant`], which is
//! usable by its grantee once its time-lock has passed.
//!
//! ## Wire Format
//!
//! A sealed message is `base64(nonce[24] || ciphertext)`, where the ciphertext
//! carries the 16-byte Poly1305 tag. The nonce is public; it only has to be
//! unique, which a fresh random nonce per seal guarantees.
//!
//! ## Soft Failure
//!
//! [`open`] returns `Ok(None)` when the message does not authenticate under
//! the given keys. That is the normal outcome for a viewer who is not the
//! recipient and must not abort batch processing.
//!
//! ## Usage
//!
//! ```rust
//! use idos_perms::{open, seal, BoxKeyPair};
//! use idos_core::codec::base64_encode;
//!
//! let owner = BoxKeyPair::generate();
//! let grantee = BoxKeyPair::generate();
//!
//! let sealed = seal(
//!     b"hello",
//!     grantee.public_key().as_bytes(),
//!     owner.secret_key().as_bytes(),
//! )
//! .unwrap();
//!
//! let opened = open(
//!     &sealed,
//!     &base64_encode(owner.public_key().as_bytes()),
//!     &base64_encode(grantee.secret_key().as_bytes()),
//! )
//! .unwrap();
//! assert_eq!(opened.as_deref(), Some(&b"hello"[..]));
//! ```

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod grant;
pub mod state;

pub use idos_core::Grant;

pub use crypto::{
    generate_nonce, BoxKeyPair, BoxNonce, BoxPublicKey, BoxSecretKey, KEY_LEN, NONCE_LEN, TAG_LEN,
};
pub use envelope::{open, seal, seal_with_nonce, SealedMessage};
pub use error::{PermsError, Result};
pub use grant::{describe_lock, is_usable, LockDisplay, UNLOCKED};
pub use state::GrantSet;
