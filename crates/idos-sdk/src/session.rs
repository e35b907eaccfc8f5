//! The authenticated session: a wallet signer plus an encryption key pair.

use std::fmt;
use std::sync::Arc;

use idos_core::{classify, normalize_address, ChainTag};
use idos_perms::{BoxKeyPair, BoxPublicKey};
use idos_signer::{Signer, WalletSignature};

use crate::error::{ClientError, Result};

/// A signed-in user.
///
/// The signer's chain is classified once from its address when the session
/// is created and not re-derived afterwards.
#[derive(Clone)]
pub struct Session {
    signer: Arc<dyn Signer>,
    chain: ChainTag,
    address: String,
    encryption: BoxKeyPair,
}

impl Session {
    /// Start a session.
    ///
    /// Fails if the signer's address is not a known format or if the signer
    /// declares a different chain than its address belongs to.
    pub fn new(signer: Arc<dyn Signer>, encryption: BoxKeyPair) -> Result<Self> {
        let detected = classify(signer.address().trim())?;
        let declared = signer.chain();
        if declared != detected {
            return Err(ClientError::SignerMismatch {
                address: signer.address().to_string(),
                declared,
                detected,
            });
        }

        let address = normalize_address(signer.address())?;
        Ok(Self {
            signer,
            chain: detected,
            address,
            encryption,
        })
    }

    pub fn chain(&self) -> ChainTag {
        self.chain
    }

    /// The signer's address in normalized form, used as the grantee identity.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The signer's address as the wallet displays it.
    pub fn display_address(&self) -> &str {
        self.signer.address()
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }

    pub fn encryption_public_key(&self) -> BoxPublicKey {
        self.encryption.public_key()
    }

    pub(crate) fn encryption_keys(&self) -> &BoxKeyPair {
        &self.encryption
    }

    /// Sign a message with the session wallet.
    pub async fn sign(&self, message: &[u8]) -> Result<WalletSignature> {
        Ok(self.signer.sign(message).await?)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("chain", &self.chain)
            .field("address", &self.address)
            .field("encryption_public_key", &self.encryption.public_key().to_base64())
            .finish()
    }
}
