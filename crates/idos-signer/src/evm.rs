//! EVM wallets: secp256k1 ECDSA over EIP-191 personal messages.
//!
//! Signatures are 65 bytes, `r || s || v`, with `v` in `{27, 28}` (raw
//! recovery ids `{0, 1}` are accepted too). Verification recovers the public
//! key from the signature and compares the derived address.

use std::fmt;

use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};

use idos_core::{normalize_address, ChainTag};

use crate::error::{Result, SignerError};
use crate::signer::{ChainVerifier, Signer, WalletSignature};

/// Length of an `r || s || v` signature.
pub const SIGNATURE_LEN: usize = 65;

const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Keccak-256 of the EIP-191 personal message envelope.
pub fn eip191_digest(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX);
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Lowercase `0x` address of a public key.
pub fn address_from_key(key: &VerifyingKey) -> String {
    let point = key.as_affine().to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// EIP-55 mixed-case form of an address.
pub fn to_checksum_address(address: &str) -> String {
    let lower = address.trim_start_matches("0x").to_ascii_lowercase();
    let hash = hex::encode(Keccak256::digest(lower.as_bytes()));

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (c, h) in lower.chars().zip(hash.chars()) {
        if c.is_ascii_alphabetic() && h.to_digit(16).unwrap_or(0) >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Recover the signing address of a personal-message signature.
pub fn recover_address(message: &[u8], signature: &[u8]) -> Option<String> {
    if signature.len() != SIGNATURE_LEN {
        return None;
    }
    let sig = Signature::from_slice(&signature[..64]).ok()?;
    let v = signature[64];
    let recovery_id = RecoveryId::from_byte(if v >= 27 { v - 27 } else { v })?;

    let key = VerifyingKey::recover_from_prehash(&eip191_digest(message), &sig, recovery_id).ok()?;
    Some(address_from_key(&key))
}

/// Verifies EVM personal-message signatures.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvmVerifier;

impl ChainVerifier for EvmVerifier {
    fn chain(&self) -> ChainTag {
        ChainTag::Evm
    }

    fn verify(&self, address: &str, message: &[u8], signature: &WalletSignature) -> bool {
        let Ok(expected) = normalize_address(address) else {
            return false;
        };
        if !ChainTag::Evm.matches(&expected) {
            return false;
        }
        recover_address(message, &signature.bytes).is_some_and(|recovered| recovered == expected)
    }
}

/// An EVM wallet holding a secp256k1 key.
pub struct EvmSigner {
    key: SigningKey,
    address: String,
}

impl EvmSigner {
    /// Generate a new random wallet.
    pub fn generate() -> Self {
        Self::from_key(SigningKey::random(&mut OsRng))
    }

    /// Load from a 32-byte secret scalar.
    pub fn from_bytes(secret: &[u8]) -> Result<Self> {
        if secret.len() != 32 {
            return Err(SignerError::InvalidKey(format!(
                "secp256k1 secret: {} bytes",
                secret.len()
            )));
        }
        let key = SigningKey::from_slice(secret)
            .map_err(|e| SignerError::InvalidKey(format!("secp256k1: {e}")))?;
        Ok(Self::from_key(key))
    }

    fn from_key(key: SigningKey) -> Self {
        let address = to_checksum_address(&address_from_key(key.verifying_key()));
        Self { key, address }
    }
}

impl fmt::Debug for EvmSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl ChainVerifier for EvmSigner {
    fn chain(&self) -> ChainTag {
        ChainTag::Evm
    }

    fn verify(&self, address: &str, message: &[u8], signature: &WalletSignature) -> bool {
        EvmVerifier.verify(address, message, signature)
    }
}

#[async_trait]
impl Signer for EvmSigner {
    fn address(&self) -> &str {
        &self.address
    }

    /// Uncompressed SEC1 point (65 bytes).
    fn public_key(&self) -> Vec<u8> {
        self.key
            .verifying_key()
            .as_affine()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    async fn sign(&self, message: &[u8]) -> Result<WalletSignature> {
        let (sig, recovery_id) = self
            .key
            .sign_prehash_recoverable(&eip191_digest(message))
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        let mut bytes = sig.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        Ok(WalletSignature::new(bytes))
    }
}
