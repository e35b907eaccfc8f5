//! NEAR wallets: ed25519 over the raw message.
//!
//! A named NEAR account can hold many keys, so a signature carries the public
//! key it was made with. Whether that key is an access key of the account is
//! answered by a [`NearKeyResolver`]; without one, every proof is rejected.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;

use idos_core::{classify, normalize_address, ChainTag};

use crate::error::{Result, SignerError};
use crate::signer::{ChainVerifier, Signer, WalletSignature};

/// Check an ed25519 signature whose public key travels with it.
pub(crate) fn verify_ed25519(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(pk) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(sig) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&pk) else {
        return false;
    };
    key.verify(message, &Signature::from_bytes(&sig)).is_ok()
}

/// Looks up the access keys of NEAR accounts.
pub trait NearKeyResolver: Send + Sync {
    /// Whether `public_key` is an access key of `account_id` (normalized).
    fn has_key(&self, account_id: &str, public_key: &[u8]) -> bool;
}

/// A resolver that knows no keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNearKeys;

impl NearKeyResolver for NoNearKeys {
    fn has_key(&self, _: &str, _: &[u8]) -> bool {
        false
    }
}

/// A fixed table of accounts and their ed25519 access keys.
#[derive(Debug, Default, Clone)]
pub struct KnownNearKeys {
    keys: HashMap<String, HashSet<[u8; 32]>>,
}

impl KnownNearKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an access key to an account.
    pub fn with_key(mut self, account_id: &str, public_key: [u8; 32]) -> Self {
        self.insert(account_id, public_key);
        self
    }

    pub fn insert(&mut self, account_id: &str, public_key: [u8; 32]) {
        self.keys
            .entry(account_key(account_id))
            .or_default()
            .insert(public_key);
    }
}

impl NearKeyResolver for KnownNearKeys {
    fn has_key(&self, account_id: &str, public_key: &[u8]) -> bool {
        let Ok(public_key) = <[u8; 32]>::try_from(public_key) else {
            return false;
        };
        self.keys
            .get(&account_key(account_id))
            .is_some_and(|keys| keys.contains(&public_key))
    }
}

fn account_key(account_id: &str) -> String {
    account_id.trim().to_ascii_lowercase()
}

/// Verifies NEAR signatures against the account's known access keys.
#[derive(Clone)]
pub struct NearVerifier {
    resolver: Arc<dyn NearKeyResolver>,
}

impl NearVerifier {
    pub fn new(resolver: Arc<dyn NearKeyResolver>) -> Self {
        Self { resolver }
    }
}

impl Default for NearVerifier {
    fn default() -> Self {
        Self::new(Arc::new(NoNearKeys))
    }
}

impl fmt::Debug for NearVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NearVerifier").finish_non_exhaustive()
    }
}

impl ChainVerifier for NearVerifier {
    fn chain(&self) -> ChainTag {
        ChainTag::Near
    }

    fn verify(&self, address: &str, message: &[u8], signature: &WalletSignature) -> bool {
        let Ok(account_id) = normalize_address(address) else {
            return false;
        };
        if !ChainTag::Near.matches(&account_id) {
            return false;
        }
        let Some(public_key) = signature.public_key.as_deref() else {
            return false;
        };
        self.resolver.has_key(&account_id, public_key)
            && verify_ed25519(message, &signature.bytes, public_key)
    }
}

/// A NEAR account with one of its ed25519 access keys.
pub struct NearSigner {
    account_id: String,
    key: SigningKey,
}

impl NearSigner {
    /// Bind a key to a named account.
    pub fn new(account_id: &str, key: SigningKey) -> Result<Self> {
        match classify(account_id.trim())? {
            ChainTag::Near => Ok(Self {
                account_id: normalize_address(account_id)?,
                key,
            }),
            other => Err(SignerError::InvalidKey(format!(
                "{account_id} is a {other} address, not a NEAR account"
            ))),
        }
    }

    /// A fresh random key for `account_id`.
    pub fn generate(account_id: &str) -> Result<Self> {
        Self::new(account_id, SigningKey::generate(&mut OsRng))
    }

    /// Load a key from its 32-byte seed.
    pub fn from_seed(account_id: &str, seed: &[u8]) -> Result<Self> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| SignerError::InvalidKey(format!("ed25519 seed: {} bytes", seed.len())))?;
        Self::new(account_id, SigningKey::from_bytes(&seed))
    }
}

impl fmt::Debug for NearSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NearSigner")
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

impl ChainVerifier for NearSigner {
    fn chain(&self) -> ChainTag {
        ChainTag::Near
    }

    /// Accepts only this signer's own account and key.
    fn verify(&self, address: &str, message: &[u8], signature: &WalletSignature) -> bool {
        let own_key = self.key.verifying_key().to_bytes();
        normalize_address(address).is_ok_and(|a| a == self.account_id)
            && signature.public_key.as_deref() == Some(&own_key[..])
            && verify_ed25519(message, &signature.bytes, &own_key)
    }
}

#[async_trait]
impl Signer for NearSigner {
    fn address(&self) -> &str {
        &self.account_id
    }

    fn public_key(&self) -> Vec<u8> {
        self.key.verifying_key().to_bytes().to_vec()
    }

    async fn sign(&self, message: &[u8]) -> Result<WalletSignature> {
        let sig = self.key.sign(message);
        Ok(WalletSignature::new(sig.to_bytes().to_vec()).with_public_key(self.public_key()))
    }
}
