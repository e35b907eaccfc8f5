//! Credential issuance.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use idos_core::Credential;
use idos_perms::{BoxKeyPair, BoxPublicKey, SealedMessage};
use idos_store::{Store, StoreExt};

use crate::error::Result;

/// An issuer that seals credentials for their owners.
pub struct Issuer<S: Store> {
    id: String,
    keys: BoxKeyPair,
    store: Arc<S>,
}

impl<S: Store> Issuer<S> {
    pub fn new(id: impl Into<String>, keys: BoxKeyPair, store: Arc<S>) -> Self {
        Self {
            id: id.into(),
            keys,
            store,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn encryption_public_key(&self) -> BoxPublicKey {
        self.keys.public_key()
    }

    /// Seal `plaintext` for an owner and store it as a new credential.
    ///
    /// `public_notes` is stored in the clear as JSON text.
    pub async fn issue_credential(
        &self,
        owner_id: &str,
        owner_encryption_key: &BoxPublicKey,
        plaintext: &[u8],
        public_notes: Option<Value>,
    ) -> Result<Credential> {
        let sealed = SealedMessage::seal(plaintext, owner_encryption_key, self.keys.secret_key())?;
        let public_notes = public_notes.map(|notes| notes.to_string());

        let credential = Credential {
            id: String::new(),
            owner_id: owner_id.to_string(),
            issuer_id: self.id.clone(),
            content: sealed.to_base64(),
            encryption_public_key: self.keys.public_key().to_base64(),
            public_notes,
            original_id: None,
            shares: Vec::new(),
        };

        let credential = self.store.create_credential(&credential).await?;
        info!(credential_id = %credential.id, owner_id, issuer = %self.id, "issued credential");
        Ok(credential)
    }
}
