//! Stellar wallets: ed25519 over SEP-53 signed messages.
//!
//! The public key is the `G...` strkey itself, so no key travels with the
//! signature.

use std::fmt;

use async_trait::async_trait;
use data_encoding::BASE32_NOPAD;
use ed25519_dalek::{Signer as _, SigningKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use idos_core::ChainTag;

use crate::error::{Result, SignerError};
use crate::near::verify_ed25519;
use crate::signer::{ChainVerifier, Signer, WalletSignature};

/// Strkey version byte for an account public key (`G`).
pub const ACCOUNT_VERSION_BYTE: u8 = 6 << 3;

const SIGNED_MESSAGE_PREFIX: &[u8] = b"Stellar Signed Message:\n";

/// SHA-256 of the SEP-53 signed message envelope.
pub fn message_digest(message: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(SIGNED_MESSAGE_PREFIX);
    hasher.update(message);
    hasher.finalize().into()
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Encode an ed25519 public key as an account strkey.
pub fn encode_account(public_key: &[u8; 32]) -> String {
    let mut payload = Vec::with_capacity(35);
    payload.push(ACCOUNT_VERSION_BYTE);
    payload.extend_from_slice(public_key);
    let crc = crc16_xmodem(&payload);
    payload.extend_from_slice(&crc.to_le_bytes());
    BASE32_NOPAD.encode(&payload)
}

/// Decode an account strkey, checking its version byte and checksum.
pub fn decode_account(address: &str) -> Option<[u8; 32]> {
    let raw = BASE32_NOPAD.decode(address.as_bytes()).ok()?;
    if raw.len() != 35 || raw[0] != ACCOUNT_VERSION_BYTE {
        return None;
    }
    let (body, checksum) = raw.split_at(33);
    if crc16_xmodem(body).to_le_bytes() != checksum {
        return None;
    }
    body[1..].try_into().ok()
}

/// Verifies Stellar signed messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct StellarVerifier;

impl ChainVerifier for StellarVerifier {
    fn chain(&self) -> ChainTag {
        ChainTag::Stellar
    }

    fn verify(&self, address: &str, message: &[u8], signature: &WalletSignature) -> bool {
        let address = address.trim();
        if !ChainTag::Stellar.matches(address) {
            return false;
        }
        let Some(public_key) = decode_account(address) else {
            return false;
        };
        verify_ed25519(&message_digest(message), &signature.bytes, &public_key)
    }
}

/// A Stellar account keypair.
pub struct StellarSigner {
    key: SigningKey,
    address: String,
}

impl StellarSigner {
    pub fn generate() -> Self {
        Self::from_key(SigningKey::generate(&mut OsRng))
    }

    /// Load from a 32-byte ed25519 seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| SignerError::InvalidKey(format!("ed25519 seed: {} bytes", seed.len())))?;
        Ok(Self::from_key(SigningKey::from_bytes(&seed)))
    }

    fn from_key(key: SigningKey) -> Self {
        let address = encode_account(key.verifying_key().as_bytes());
        Self { key, address }
    }
}

impl fmt::Debug for StellarSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StellarSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl ChainVerifier for StellarSigner {
    fn chain(&self) -> ChainTag {
        ChainTag::Stellar
    }

    fn verify(&self, address: &str, message: &[u8], signature: &WalletSignature) -> bool {
        StellarVerifier.verify(address, message, signature)
    }
}

#[async_trait]
impl Signer for StellarSigner {
    fn address(&self) -> &str {
        &self.address
    }

    fn public_key(&self) -> Vec<u8> {
        self.key.verifying_key().to_bytes().to_vec()
    }

    async fn sign(&self, message: &[u8]) -> Result<WalletSignature> {
        let sig = self.key.sign(&message_digest(message));
        Ok(WalletSignature::new(sig.to_bytes().to_vec()))
    }
}
