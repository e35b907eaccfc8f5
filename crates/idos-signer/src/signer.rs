//! Signer and verifier traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use idos_core::ChainTag;

use crate::error::Result;

/// A signature produced by a wallet.
///
/// Chains that cannot recover the signer's key from the signature alone
/// (NEAR, XRPL) carry the public key alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSignature {
    pub bytes: Vec<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Vec<u8>>,
}

impl WalletSignature {
    /// A signature without an attached public key.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            public_key: None,
        }
    }

    pub fn with_public_key(mut self, public_key: Vec<u8>) -> Self {
        self.public_key = Some(public_key);
        self
    }

    /// Lowercase hex of the signature bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Lowercase hex of the attached public key, if any.
    pub fn public_key_hex(&self) -> Option<String> {
        self.public_key.as_deref().map(hex::encode)
    }

    /// Rebuild from the hex fields of a wallet record.
    pub fn from_hex(signature: &str, public_key: Option<&str>) -> Option<Self> {
        let bytes = hex::decode(signature.trim_start_matches("0x")).ok()?;
        let public_key = match public_key {
            Some(pk) => Some(hex::decode(pk.trim_start_matches("0x")).ok()?),
            None => None,
        };
        Some(Self { bytes, public_key })
    }
}

/// Checks wallet signatures for one chain.
pub trait ChainVerifier: Send + Sync {
    /// The chain this verifier handles.
    fn chain(&self) -> ChainTag;

    /// Whether `signature` over `message` was made by `address`.
    ///
    /// Malformed input and addresses of another chain yield `false`.
    fn verify(&self, address: &str, message: &[u8], signature: &WalletSignature) -> bool;
}

/// A wallet able to sign messages.
#[async_trait]
pub trait Signer: ChainVerifier {
    /// The wallet address, in the chain's display form.
    fn address(&self) -> &str;

    /// The raw public key bytes.
    fn public_key(&self) -> Vec<u8>;

    /// Sign a message.
    async fn sign(&self, message: &[u8]) -> Result<WalletSignature>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_fields() {
        let sig = WalletSignature::new(vec![0xab, 0xcd]).with_public_key(vec![0x01]);
        assert_eq!(sig.to_hex(), "abcd");
        assert_eq!(sig.public_key_hex().as_deref(), Some("01"));

        let back = WalletSignature::from_hex("0xabcd", Some("01")).unwrap();
        assert_eq!(back, sig);
        assert!(WalletSignature::from_hex("zz", None).is_none());
        assert!(WalletSignature::from_hex("ab", Some("zz")).is_none());
    }
}
