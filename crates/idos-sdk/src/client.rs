//! The Client: credential sharing and grant-gated decryption.
//!
//! The client brings together a [`Session`], a record store, and the chain
//! verifier registry. Decrypting a shared credential consults the grant
//! evaluator first, using the session's classified address and the grant's
//! time-lock.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use idos_core::{codec, normalize_address, Credential, Grant, Wallet};
use idos_perms::{describe_lock, BoxPublicKey, GrantSet, LockDisplay, SealedMessage};
use idos_signer::{SignerRegistry, WalletSignature};
use idos_store::{from_record, Record, Store, StoreExt, Table};

use crate::error::{ClientError, Result};
use crate::session::Session;

/// Configuration for the Client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How lock deadlines are rendered by [`Client::describe_lock`].
    pub lock_display: LockDisplay,
    /// Whether `add_wallet` checks its own proof before storing it.
    pub verify_wallets_on_add: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            lock_display: LockDisplay::utc(),
            verify_wallets_on_add: true,
        }
    }
}

/// A credential copy made for a grantee, with the grant that covers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedCredential {
    pub credential: Credential,
    pub grant: Grant,
}

/// What happened to one item of a batch decryption.
#[derive(Debug)]
pub enum DecryptOutcome {
    /// Plaintext recovered.
    Decrypted(Vec<u8>),
    /// The credential exists but does not open with this session's key.
    NotDecryptable,
    /// The grant points at a credential the store does not return.
    Missing,
    /// The item failed for another reason.
    Failed(ClientError),
}

impl DecryptOutcome {
    pub fn plaintext(&self) -> Option<&[u8]> {
        match self {
            DecryptOutcome::Decrypted(p) => Some(p),
            _ => None,
        }
    }
}

/// One item of a batch decryption.
#[derive(Debug)]
pub struct BatchItem {
    pub grant_id: String,
    pub credential_id: String,
    pub outcome: DecryptOutcome,
}

/// The main Client struct.
pub struct Client<S: Store> {
    session: Session,
    store: Arc<S>,
    registry: SignerRegistry,
    config: ClientConfig,
}

impl<S: Store> Client<S> {
    /// Create a client that owns its store.
    pub fn new(session: Session, store: S, config: ClientConfig) -> Self {
        Self::with_shared_store(session, Arc::new(store), config)
    }

    /// Create a client over a store shared with other clients.
    ///
    /// The registry covers every chain but knows no NEAR access keys; supply
    /// one with [`Client::with_registry`] to accept NEAR wallets.
    pub fn with_shared_store(session: Session, store: Arc<S>, config: ClientConfig) -> Self {
        Self {
            session,
            store,
            registry: SignerRegistry::with_default_chains(),
            config,
        }
    }

    /// Replace the verifier registry.
    pub fn with_registry(mut self, registry: SignerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grants
    // ─────────────────────────────────────────────────────────────────────────

    /// All grants naming this session as grantee.
    pub async fn grants(&self) -> Result<GrantSet> {
        let grants = self.store.list_grants_for(self.session.address()).await?;
        debug!(grantee = %self.session.address(), count = grants.len(), "loaded grants");
        Ok(GrantSet::from_grants(grants))
    }

    /// Grants naming this session that are usable at `now`.
    pub async fn usable_grants(&self, now: u64) -> Result<Vec<Grant>> {
        let grants = self.grants().await?;
        Ok(grants
            .usable_for(self.session.address(), now)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Lock status of a grant, rendered with the configured display policy.
    pub fn describe_lock(&self, grant: &Grant, now: u64) -> String {
        describe_lock(grant, now, &self.config.lock_display)
    }

    /// Revoke a grant this session created.
    pub async fn revoke_grant(&self, grant_id: &str) -> Result<()> {
        let grant = self
            .store
            .get_grant(grant_id)
            .await?
            .ok_or_else(|| ClientError::GrantNotFound(grant_id.to_string()))?;

        let owned = grant
            .owner
            .as_deref()
            .and_then(|owner| normalize_address(owner).ok())
            .is_some_and(|owner| owner == self.session.address());
        if !owned {
            return Err(ClientError::NotAuthorized(format!(
                "grant {grant_id} was not issued by {}",
                self.session.address()
            )));
        }

        self.store.revoke_grant(grant_id).await?;
        info!(grant_id, "revoked grant");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Owner Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Decrypt an original credential sealed for this session.
    ///
    /// This is how an owner reads credentials issued to them. Shared copies
    /// are refused here; they are read through [`Client::decrypt_shared`],
    /// which honours the grant time-lock.
    pub async fn decrypt_own(&self, credential_id: &str) -> Result<Vec<u8>> {
        let credential = self
            .store
            .get_credential(credential_id)
            .await?
            .ok_or_else(|| ClientError::CredentialNotFound(credential_id.to_string()))?;
        if credential.is_shared_copy() {
            return Err(ClientError::NotAuthorized(format!(
                "credential {credential_id} is a shared copy"
            )));
        }

        self.open_credential(&credential)?
            .ok_or_else(|| ClientError::NotDecryptable(credential_id.to_string()))
    }

    /// Share one of this session's credentials with a grantee.
    ///
    /// Opens the credential, reseals it for `grantee_encryption_key`, stores
    /// the copy, and stores a grant for `grantee_address` that covers it.
    pub async fn share_credential(
        &self,
        credential_id: &str,
        grantee_address: &str,
        grantee_encryption_key: &BoxPublicKey,
        locked_until: u64,
    ) -> Result<SharedCredential> {
        let grantee = normalize_address(grantee_address)?;

        let original = self
            .store
            .get_credential(credential_id)
            .await?
            .ok_or_else(|| ClientError::CredentialNotFound(credential_id.to_string()))?;
        if original.is_shared_copy() {
            return Err(ClientError::NotAuthorized(format!(
                "credential {credential_id} is itself a shared copy"
            )));
        }

        let plaintext = self.open_credential(&original)?.ok_or_else(|| {
            ClientError::NotAuthorized(format!(
                "credential {credential_id} is not sealed for this session"
            ))
        })?;

        let keys = self.session.encryption_keys();
        let sealed = SealedMessage::seal(&plaintext, grantee_encryption_key, keys.secret_key())?;

        let copy = Credential {
            id: String::new(),
            owner_id: original.owner_id.clone(),
            issuer_id: original.issuer_id.clone(),
            content: sealed.to_base64(),
            encryption_public_key: keys.public_key().to_base64(),
            public_notes: original.public_notes.clone(),
            original_id: Some(original.id.clone()),
            shares: Vec::new(),
        };
        let credential = self.store.create_credential(&copy).await?;

        let grant = Grant::new("", grantee, locked_until)
            .with_owner(self.session.address())
            .with_data(credential.id.clone());
        let grant = match self.store.create_grant(&grant).await {
            Ok(grant) => grant,
            Err(e) => {
                // A copy without a grant is unreachable; take it back out.
                if let Err(cleanup) = self.store.delete(Table::Credentials, &credential.id).await {
                    warn!(copy_id = %credential.id, error = %cleanup, "failed to remove orphaned copy");
                }
                return Err(e.into());
            }
        };

        info!(
            original_id = %original.id,
            copy_id = %credential.id,
            grant_id = %grant.id,
            locked_until,
            "shared credential"
        );
        Ok(SharedCredential { credential, grant })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Consumer Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Decrypt a credential shared with this session.
    ///
    /// Requires a grant for the credential that is usable at `now`.
    pub async fn decrypt_shared(&self, credential_id: &str, now: u64) -> Result<Vec<u8>> {
        let grants = self.grants().await?;
        if grants
            .usable_for_data(self.session.address(), credential_id, now)
            .is_none()
        {
            return Err(ClientError::NoUsableGrant {
                credential_id: credential_id.to_string(),
                grantee: self.session.address().to_string(),
            });
        }

        self.decrypt_granted(credential_id).await
    }

    /// Decrypt every credential covered by a grant usable at `now`.
    ///
    /// Items are processed concurrently. A failing item is reported in its
    /// outcome and does not stop the others.
    pub async fn decrypt_all(&self, now: u64) -> Result<Vec<BatchItem>> {
        let grants = self.usable_grants(now).await?;

        let jobs = grants.into_iter().filter_map(|grant| {
            let credential_id = grant.data_id.clone()?;
            Some(async move {
                let outcome = match self.decrypt_granted(&credential_id).await {
                    Ok(plaintext) => DecryptOutcome::Decrypted(plaintext),
                    Err(ClientError::NotDecryptable(_)) => DecryptOutcome::NotDecryptable,
                    Err(ClientError::CredentialNotFound(_)) => DecryptOutcome::Missing,
                    Err(e) => DecryptOutcome::Failed(e),
                };
                BatchItem {
                    grant_id: grant.id,
                    credential_id,
                    outcome,
                }
            })
        });

        let items = join_all(jobs).await;
        for item in &items {
            if item.outcome.plaintext().is_none() {
                warn!(
                    grant_id = %item.grant_id,
                    credential_id = %item.credential_id,
                    outcome = %outcome_kind(&item.outcome),
                    "credential not decrypted"
                );
            }
        }
        debug!(count = items.len(), "batch decryption finished");
        Ok(items)
    }

    /// Fetch a shared record, optionally decrypting its content.
    ///
    /// With `decrypt` set on a credential, `content` is replaced by the UTF-8
    /// plaintext. Decrypting needs a grant usable at `now`, as in
    /// [`Client::decrypt_shared`].
    pub async fn get_shared(
        &self,
        table: Table,
        id: &str,
        decrypt: bool,
        now: u64,
    ) -> Result<Option<Record>> {
        let Some(mut record) = self.store.get_shared(table, id).await? else {
            return Ok(None);
        };
        if !decrypt || table != Table::Credentials {
            return Ok(Some(record));
        }

        let grants = self.grants().await?;
        if grants.usable_for_data(self.session.address(), id, now).is_none() {
            return Err(ClientError::NoUsableGrant {
                credential_id: id.to_string(),
                grantee: self.session.address().to_string(),
            });
        }

        let credential: Credential = from_record(record.clone())?;
        let plaintext = self
            .open_credential(&credential)?
            .ok_or_else(|| ClientError::NotDecryptable(id.to_string()))?;
        record.insert("content".into(), Value::String(codec::utf8_decode(&plaintext)?));
        Ok(Some(record))
    }

    async fn decrypt_granted(&self, credential_id: &str) -> Result<Vec<u8>> {
        let credential = self
            .store
            .get_shared_credential(credential_id)
            .await?
            .ok_or_else(|| ClientError::CredentialNotFound(credential_id.to_string()))?;

        self.open_credential(&credential)?
            .ok_or_else(|| ClientError::NotDecryptable(credential_id.to_string()))
    }

    /// Open a credential with the session's secret key.
    fn open_credential(&self, credential: &Credential) -> Result<Option<Vec<u8>>> {
        let sender = BoxPublicKey::from_base64(&credential.encryption_public_key)?;
        let Some(sealed) = SealedMessage::from_base64(&credential.content)? else {
            return Ok(None);
        };
        Ok(sealed.open(&sender, self.session.encryption_keys().secret_key()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wallets
    // ─────────────────────────────────────────────────────────────────────────

    /// Link the session wallet to a human by signing `message`.
    pub async fn add_wallet(&self, human_id: &str, message: &str) -> Result<Wallet> {
        let signature = self.session.sign(message.as_bytes()).await?;

        let mut wallet = Wallet::new(self.session.display_address(), human_id)?;
        wallet.public_key = Some(codec::hex_encode(
            &self.session.signer().public_key(),
            codec::HexCase::Lower,
        ));
        wallet.message = Some(message.to_string());
        wallet.signature = Some(signature.to_hex());

        if self.config.verify_wallets_on_add && !self.verify_wallet(&wallet) {
            return Err(ClientError::InvalidWallet(wallet.address));
        }

        let wallet = self.store.create_wallet(&wallet).await?;
        info!(address = %wallet.address, human_id, "added wallet");
        Ok(wallet)
    }

    /// Check a wallet record's ownership proof.
    ///
    /// The chain is derived from the address, never from `wallet_type`.
    /// Missing or malformed proof fields yield `false`.
    pub fn verify_wallet(&self, wallet: &Wallet) -> bool {
        let (Some(message), Some(signature)) = (&wallet.message, &wallet.signature) else {
            return false;
        };
        let Some(signature) = WalletSignature::from_hex(signature, wallet.public_key.as_deref())
        else {
            return false;
        };
        self.registry
            .verify(&wallet.address, message.as_bytes(), &signature)
    }

    /// Wallets linked to a human.
    pub async fn wallets(&self, human_id: &str) -> Result<Vec<Wallet>> {
        Ok(self.store.list_wallets(human_id).await?)
    }
}

fn outcome_kind(outcome: &DecryptOutcome) -> &'static str {
    match outcome {
        DecryptOutcome::Decrypted(_) => "decrypted",
        DecryptOutcome::NotDecryptable => "not_decryptable",
        DecryptOutcome::Missing => "missing",
        DecryptOutcome::Failed(_) => "failed",
    }
}

