//! XRPL wallets.
//!
//! An account may use a secp256k1 key (DER signature over the first half of
//! SHA-512 of the message) or an ed25519 key (raw message, public key
//! prefixed with `0xED`). The address is derived from the public key, which
//! travels with the signature.

use std::fmt;

use async_trait::async_trait;
use ed25519_dalek::Signer as _;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

use idos_core::ChainTag;

use crate::error::{Result, SignerError};
use crate::near::verify_ed25519;
use crate::signer::{ChainVerifier, Signer, WalletSignature};

/// Type prefix marking an ed25519 public key.
pub const ED25519_PREFIX: u8 = 0xED;

const ACCOUNT_ID_VERSION: u8 = 0x00;

/// First 32 bytes of SHA-512.
pub fn sha512_half(message: &[u8]) -> [u8; 32] {
    let digest = Sha512::digest(message);
    let mut half = [0u8; 32];
    half.copy_from_slice(&digest[..32]);
    half
}

/// Classic address of a 33-byte public key.
pub fn address_from_public_key(public_key: &[u8]) -> String {
    let account_id = Ripemd160::digest(Sha256::digest(public_key));

    let mut payload = Vec::with_capacity(25);
    payload.push(ACCOUNT_ID_VERSION);
    payload.extend_from_slice(&account_id);
    let checksum = Sha256::digest(Sha256::digest(&payload));
    payload.extend_from_slice(&checksum[..4]);

    bs58::encode(payload)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

/// Verifies XRPL signatures of either key type.
#[derive(Debug, Default, Clone, Copy)]
pub struct XrplVerifier;

impl ChainVerifier for XrplVerifier {
    fn chain(&self) -> ChainTag {
        ChainTag::Xrpl
    }

    fn verify(&self, address: &str, message: &[u8], signature: &WalletSignature) -> bool {
        let address = address.trim();
        if !ChainTag::Xrpl.matches(address) {
            return false;
        }
        let Some(public_key) = signature.public_key.as_deref() else {
            return false;
        };
        if public_key.len() != 33 || address_from_public_key(public_key) != address {
            return false;
        }

        match public_key[0] {
            ED25519_PREFIX => verify_ed25519(message, &signature.bytes, &public_key[1..]),
            0x02 | 0x03 => verify_secp256k1(message, &signature.bytes, public_key),
            _ => false,
        }
    }
}

fn verify_secp256k1(message: &[u8], der: &[u8], public_key: &[u8]) -> bool {
    let Ok(key) = k256::ecdsa::VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = k256::ecdsa::Signature::from_der(der) else {
        return false;
    };
    key.verify_prehash(&sha512_half(message), &sig).is_ok()
}

enum XrplKey {
    Secp256k1(k256::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

/// An XRPL wallet.
pub struct XrplSigner {
    key: XrplKey,
    address: String,
}

impl XrplSigner {
    /// A fresh secp256k1 wallet.
    pub fn generate_secp256k1() -> Self {
        Self::from_key(XrplKey::Secp256k1(k256::ecdsa::SigningKey::random(&mut OsRng)))
    }

    /// A fresh ed25519 wallet.
    pub fn generate_ed25519() -> Self {
        Self::from_key(XrplKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng)))
    }

    /// Load a secp256k1 wallet from its 32-byte secret scalar.
    pub fn secp256k1_from_bytes(secret: &[u8]) -> Result<Self> {
        if secret.len() != 32 {
            return Err(SignerError::InvalidKey(format!(
                "secp256k1 secret: {} bytes",
                secret.len()
            )));
        }
        let key = k256::ecdsa::SigningKey::from_slice(secret)
            .map_err(|e| SignerError::InvalidKey(format!("secp256k1: {e}")))?;
        Ok(Self::from_key(XrplKey::Secp256k1(key)))
    }

    /// Load an ed25519 wallet from its 32-byte seed.
    pub fn ed25519_from_seed(seed: &[u8]) -> Result<Self> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| SignerError::InvalidKey(format!("ed25519 seed: {} bytes", seed.len())))?;
        Ok(Self::from_key(XrplKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(&seed))))
    }

    fn from_key(key: XrplKey) -> Self {
        let address = address_from_public_key(&public_key_of(&key));
        Self { key, address }
    }
}

fn public_key_of(key: &XrplKey) -> Vec<u8> {
    match key {
        XrplKey::Secp256k1(k) => k
            .verifying_key()
            .as_affine()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec(),
        XrplKey::Ed25519(k) => {
            let mut out = Vec::with_capacity(33);
            out.push(ED25519_PREFIX);
            out.extend_from_slice(k.verifying_key().as_bytes());
            out
        }
    }
}

impl fmt::Debug for XrplSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.key {
            XrplKey::Secp256k1(_) => "secp256k1",
            XrplKey::Ed25519(_) => "ed25519",
        };
        f.debug_struct("XrplSigner")
            .field("address", &self.address)
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}

impl ChainVerifier for XrplSigner {
    fn chain(&self) -> ChainTag {
        ChainTag::Xrpl
    }

    fn verify(&self, address: &str, message: &[u8], signature: &WalletSignature) -> bool {
        XrplVerifier.verify(address, message, signature)
    }
}

#[async_trait]
impl Signer for XrplSigner {
    fn address(&self) -> &str {
        &self.address
    }

    /// 33 bytes: compressed secp256k1 point, or `0xED` then the ed25519 key.
    fn public_key(&self) -> Vec<u8> {
        public_key_of(&self.key)
    }

    async fn sign(&self, message: &[u8]) -> Result<WalletSignature> {
        let bytes = match &self.key {
            XrplKey::Secp256k1(k) => {
                let sig: k256::ecdsa::Signature = k
                    .sign_prehash(&sha512_half(message))
                    .map_err(|e| SignerError::Signing(e.to_string()))?;
                sig.to_der().as_bytes().to_vec()
            }
            XrplKey::Ed25519(k) => k.sign(message).to_bytes().to_vec(),
        };
        Ok(WalletSignature::new(bytes).with_public_key(self.public_key()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS_PUBLIC_KEY: &str =
        "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020";
    const GENESIS_ADDRESS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    #[test]
    fn test_genesis_address() {
        let pk = hex::decode(GENESIS_PUBLIC_KEY).unwrap();
        assert_eq!(address_from_public_key(&pk), GENESIS_ADDRESS);
    }

    #[test]
    fn test_sha512_half() {
        assert_eq!(
            hex::encode(sha512_half(b"hello")),
            "9b71d224bd62f3785d96d46ad3ea3d73319bfbc2890caadae2dff72519673ca7"
        );
    }

    #[test]
    fn test_generated_addresses_classify_as_xrpl() {
        for signer in [XrplSigner::generate_secp256k1(), XrplSigner::generate_ed25519()] {
            assert!(ChainTag::Xrpl.matches(signer.address()), "{signer:?}");
            assert_eq!(signer.public_key().len(), 33);
        }
    }

    #[test]
    fn test_secret_length_enforced() {
        for len in [24, 31, 33] {
            assert!(matches!(
                XrplSigner::secp256k1_from_bytes(&vec![1u8; len]),
                Err(SignerError::InvalidKey(_))
            ));
            assert!(XrplSigner::ed25519_from_seed(&vec![1u8; len]).is_err());
        }
        assert!(XrplSigner::secp256k1_from_bytes(&[1u8; 32]).is_ok());
        assert!(XrplSigner::ed25519_from_seed(&[1u8; 32]).is_ok());
    }

    #[tokio::test]
    async fn test_secp256k1_sign_and_verify() {
        let signer = XrplSigner::generate_secp256k1();
        let sig = signer.sign(b"hello").await.unwrap();

        assert_eq!(sig.bytes[0], 0x30, "DER sequence");
        assert!(XrplVerifier.verify(signer.address(), b"hello", &sig));
        assert!(!XrplVerifier.verify(signer.address(), b"bye", &sig));
    }

    #[tokio::test]
    async fn test_ed25519_sign_and_verify() {
        let signer = XrplSigner::ed25519_from_seed(&[9; 32]).unwrap();
        let sig = signer.sign(b"hello").await.unwrap();

        assert_eq!(sig.public_key.as_ref().unwrap()[0], ED25519_PREFIX);
        assert!(signer.verify(signer.address(), b"hello", &sig));
        assert!(!signer.verify(signer.address(), b"hellp", &sig));
    }

    #[tokio::test]
    async fn test_key_must_match_address() {
        let signer = XrplSigner::generate_secp256k1();
        let other = XrplSigner::generate_secp256k1();
        let sig = signer.sign(b"hello").await.unwrap();

        assert!(!XrplVerifier.verify(other.address(), b"hello", &sig));

        let stripped = WalletSignature::new(sig.bytes.clone());
        assert!(!XrplVerifier.verify(signer.address(), b"hello", &stripped));
    }

    #[test]
    fn test_invalid_keys_rejected() {
        assert!(XrplSigner::secp256k1_from_bytes(&[0u8; 32]).is_err());
        assert!(XrplSigner::ed25519_from_seed(&[0u8; 16]).is_err());
    }
}
