//! Key and nonce types for the credential box.
//!
//! Provides X25519 key pairs and 24-byte nonces for curve25519-xsalsa20-poly1305.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

use idos_core::codec::{self, decode_fixed};

use crate::error::{PermsError, Result};

/// Length of box public and secret keys.
pub const KEY_LEN: usize = 32;

/// Length of the box nonce.
pub const NONCE_LEN: usize = 24;

/// Length of the Poly1305 authentication tag appended by the box.
pub const TAG_LEN: usize = 16;

/// Fill `len` bytes from the operating system CSPRNG.
pub fn generate_nonce(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// A box public key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxPublicKey(pub [u8; KEY_LEN]);

impl BoxPublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        decode_fixed(bytes)
            .map(Self)
            .map_err(|e| PermsError::InvalidKey(format!("public key: {e}")))
    }

    /// Parse from base64.
    pub fn from_base64(text: &str) -> Result<Self> {
        Self::from_slice(&codec::base64_decode(text)?)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Encode as base64.
    pub fn to_base64(&self) -> String {
        codec::base64_encode(&self.0)
    }
}

/// A box secret key.
///
/// Zeroed on drop. `Debug` never prints the key.
#[derive(Clone)]
pub struct BoxSecretKey([u8; KEY_LEN]);

impl BoxSecretKey {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        decode_fixed(bytes)
            .map(Self)
            .map_err(|e| PermsError::InvalidKey(format!("secret key: {e}")))
    }

    /// Parse from base64.
    pub fn from_base64(text: &str) -> Result<Self> {
        let mut bytes = codec::base64_decode(text)?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    /// Get the raw bytes (secret key material).
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Derive the public key.
    pub fn public_key(&self) -> BoxPublicKey {
        let secret = StaticSecret::from(self.0);
        BoxPublicKey(PublicKey::from(&secret).to_bytes())
    }

    pub(crate) fn to_box_secret(&self) -> crypto_box::SecretKey {
        crypto_box::SecretKey::from(self.0)
    }
}

impl Drop for BoxSecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for BoxSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxSecretKey(pub={})", &self.public_key().to_base64()[..8])
    }
}

/// A key pair for sealing and opening credentials.
#[derive(Debug, Clone)]
pub struct BoxKeyPair {
    secret: BoxSecretKey,
    public: BoxPublicKey,
}

impl BoxKeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        Self::from_secret(BoxSecretKey::generate())
    }

    /// Build from an existing secret.
    pub fn from_secret(secret: BoxSecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Build from a 32-byte seed.
    pub fn from_seed(seed: [u8; KEY_LEN]) -> Self {
        Self::from_secret(BoxSecretKey::from_bytes(seed))
    }

    pub fn public_key(&self) -> BoxPublicKey {
        self.public
    }

    pub fn secret_key(&self) -> &BoxSecretKey {
        &self.secret
    }
}

/// A 192-bit nonce for XSalsa20-Poly1305.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxNonce(pub [u8; NONCE_LEN]);

impl BoxNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}
