//! Chain-tagged verifier registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use idos_core::{classify, ChainTag};

use crate::error::{Result, SignerError};
use crate::evm::EvmVerifier;
use crate::near::{NearKeyResolver, NearVerifier};
use crate::signer::{ChainVerifier, WalletSignature};
use crate::stellar::StellarVerifier;
use crate::xrpl::XrplVerifier;

/// Maps chain tags to their verifiers.
///
/// Populated once at startup and read-only afterwards.
#[derive(Clone, Default)]
pub struct SignerRegistry {
    verifiers: HashMap<ChainTag, Arc<dyn ChainVerifier>>,
}

impl SignerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with verifiers for every supported chain.
    ///
    /// NEAR proofs are rejected until a key resolver is supplied with
    /// [`SignerRegistry::with_near_keys`].
    pub fn with_default_chains() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EvmVerifier));
        registry.register(Arc::new(NearVerifier::default()));
        registry.register(Arc::new(XrplVerifier));
        registry.register(Arc::new(StellarVerifier));
        registry
    }

    /// Every supported chain, with NEAR access keys looked up in `resolver`.
    pub fn with_near_keys(resolver: Arc<dyn NearKeyResolver>) -> Self {
        let mut registry = Self::with_default_chains();
        registry.register(Arc::new(NearVerifier::new(resolver)));
        registry
    }

    /// Register a verifier under its own chain tag, returning any it replaced.
    pub fn register(&mut self, verifier: Arc<dyn ChainVerifier>) -> Option<Arc<dyn ChainVerifier>> {
        self.verifiers.insert(verifier.chain(), verifier)
    }

    /// Registered chains, in classification order.
    pub fn chains(&self) -> Vec<ChainTag> {
        ChainTag::ALL
            .into_iter()
            .filter(|tag| self.verifiers.contains_key(tag))
            .collect()
    }

    pub fn get(&self, chain: ChainTag) -> Option<&Arc<dyn ChainVerifier>> {
        self.verifiers.get(&chain)
    }

    /// The verifier for the chain `address` belongs to.
    pub fn verifier_for(&self, address: &str) -> Result<Arc<dyn ChainVerifier>> {
        let chain = classify(address.trim())?;
        self.verifiers
            .get(&chain)
            .cloned()
            .ok_or_else(|| SignerError::UnsupportedChain(chain.to_string()))
    }

    /// Verify a wallet signature, dispatching on the address format.
    ///
    /// Unknown address formats and unregistered chains yield `false`.
    pub fn verify(&self, address: &str, message: &[u8], signature: &WalletSignature) -> bool {
        self.verifier_for(address)
            .map(|verifier| verifier.verify(address, message, signature))
            .unwrap_or(false)
    }
}

impl fmt::Debug for SignerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerRegistry")
            .field("chains", &self.chains())
            .finish()
    }
}
