//! Test fixtures and helpers.
//!
//! Deterministic parties for multi-party credential scenarios.

use std::sync::Arc;

use idos_core::{ChainTag, Credential};
use idos_perms::{BoxKeyPair, BoxPublicKey, SealedMessage};
use idos_signer::{
    EvmSigner, KnownNearKeys, NearSigner, Signer, SignerRegistry, StellarSigner, XrplSigner,
};
use idos_store::{Store, StoreExt};

/// A test participant: one encryption key pair and one wallet per chain.
///
/// Everything is derived from `index`, so two parties with the same index
/// hold the same keys.
pub struct Party {
    pub index: u8,
    pub keys: BoxKeyPair,
}

impl Party {
    /// Create a party. `index` must be non-zero.
    pub fn new(index: u8) -> Self {
        Self {
            index,
            keys: BoxKeyPair::from_seed(seed(index, 0xB0)),
        }
    }

    /// The party's NEAR account name.
    pub fn near_account(&self) -> String {
        format!("party-{}.testnet", self.index)
    }

    pub fn encryption_public_key(&self) -> BoxPublicKey {
        self.keys.public_key()
    }

    /// The party's wallet on `chain`.
    pub fn signer(&self, chain: ChainTag) -> Arc<dyn Signer> {
        self.try_signer(chain)
            .unwrap_or_else(|e| panic!("fixture signer for {chain}: {e}"))
    }

    /// The ed25519 access key behind [`Party::near_account`].
    pub fn near_public_key(&self) -> [u8; 32] {
        NearSigner::from_seed(&self.near_account(), &seed(self.index, 0x4E))
            .map(|signer| signer.public_key())
            .ok()
            .and_then(|key| key.try_into().ok())
            .unwrap_or_else(|| panic!("fixture near key for party {}", self.index))
    }

    /// The party's XRPL wallet with an Ed25519 key instead of secp256k1.
    pub fn xrpl_ed25519_signer(&self) -> Arc<dyn Signer> {
        let signer = XrplSigner::ed25519_from_seed(&seed(self.index, 0x3D))
            .unwrap_or_else(|e| panic!("fixture xrpl ed25519 signer: {e}"));
        Arc::new(signer)
    }

    fn try_signer(&self, chain: ChainTag) -> idos_signer::Result<Arc<dyn Signer>> {
        let signer: Arc<dyn Signer> = match chain {
            ChainTag::Evm => Arc::new(EvmSigner::from_bytes(&seed(self.index, 0xE0))?),
            ChainTag::Near => Arc::new(NearSigner::from_seed(
                &self.near_account(),
                &seed(self.index, 0x4E),
            )?),
            ChainTag::Xrpl => Arc::new(XrplSigner::secp256k1_from_bytes(&seed(self.index, 0x3C))?),
            ChainTag::Stellar => Arc::new(StellarSigner::from_seed(&seed(self.index, 0x57))?),
        };
        Ok(signer)
    }
}

/// Parties numbered `1..=count`.
pub fn parties(count: u8) -> Vec<Party> {
    (1..=count).map(Party::new).collect()
}

/// The NEAR access keys of `parties`.
pub fn near_keys<'a>(parties: impl IntoIterator<Item = &'a Party>) -> KnownNearKeys {
    parties
        .into_iter()
        .fold(KnownNearKeys::new(), |keys, party| {
            keys.with_key(&party.near_account(), party.near_public_key())
        })
}

/// A registry for every chain that resolves the NEAR keys of `parties`.
pub fn registry_for<'a>(parties: impl IntoIterator<Item = &'a Party>) -> SignerRegistry {
    SignerRegistry::with_near_keys(Arc::new(near_keys(parties)))
}

/// Seal each plaintext for `owner_key` and store it, returning the new ids.
pub async fn stored_credentials<S: Store + ?Sized>(
    store: &S,
    issuer: &BoxKeyPair,
    owner_id: &str,
    owner_key: &BoxPublicKey,
    plaintexts: &[&[u8]],
) -> Vec<String> {
    let mut ids = Vec::with_capacity(plaintexts.len());
    for plaintext in plaintexts {
        let credential = sealed_credential(issuer, owner_id, owner_key, plaintext);
        let created = store
            .create_credential(&credential)
            .await
            .unwrap_or_else(|e| panic!("fixture store credential: {e}"));
        ids.push(created.id);
    }
    ids
}

/// A credential sealed by `issuer` for `owner_key`, not yet stored.
pub fn sealed_credential(
    issuer: &BoxKeyPair,
    owner_id: &str,
    owner_key: &BoxPublicKey,
    plaintext: &[u8],
) -> Credential {
    let sealed = SealedMessage::seal(plaintext, owner_key, issuer.secret_key())
        .unwrap_or_else(|e| panic!("fixture seal: {e}"));
    Credential {
        id: String::new(),
        owner_id: owner_id.to_string(),
        issuer_id: "test-issuer".to_string(),
        content: sealed.to_base64(),
        encryption_public_key: issuer.public_key().to_base64(),
        public_notes: None,
        original_id: None,
        shares: Vec::new(),
    }
}

fn seed(index: u8, domain: u8) -> [u8; 32] {
    let mut seed = [index; 32];
    seed[0] = domain;
    seed
}

#[cfg(test)]
mod tests {
    use super::*;
    use idos_core::classify;

    #[test]
    fn test_party_has_a_wallet_per_chain() {
        let party = Party::new(3);
        for chain in ChainTag::ALL {
            let signer = party.signer(chain);
            assert_eq!(signer.chain(), chain);
            assert_eq!(classify(signer.address()), Ok(chain));
        }
        assert_eq!(classify(party.xrpl_ed25519_signer().address()), Ok(ChainTag::Xrpl));
    }

    #[test]
    fn test_parties_are_deterministic_and_distinct() {
        let a = Party::new(1);
        let b = Party::new(1);
        let c = Party::new(2);
        assert_eq!(a.encryption_public_key(), b.encryption_public_key());
        assert_ne!(a.encryption_public_key(), c.encryption_public_key());
        assert_eq!(
            a.signer(ChainTag::Evm).address(),
            b.signer(ChainTag::Evm).address()
        );
        assert_ne!(
            a.signer(ChainTag::Stellar).address(),
            c.signer(ChainTag::Stellar).address()
        );
        assert_eq!(parties(4).len(), 4);
    }

    #[tokio::test]
    async fn test_party_near_keys_verify() {
        let (alice, bob) = (Party::new(1), Party::new(2));
        let registry = registry_for([&alice]);

        let signer = alice.signer(ChainTag::Near);
        assert_eq!(signer.public_key(), alice.near_public_key());
        let sig = signer.sign(b"link").await.unwrap();
        assert!(registry.verify(signer.address(), b"link", &sig));

        let sig = bob.signer(ChainTag::Near).sign(b"link").await.unwrap();
        assert!(!registry.verify(&bob.near_account(), b"link", &sig));
    }

    #[tokio::test]
    async fn test_stored_credentials() {
        let store = idos_store::MemoryStore::new();
        let issuer = BoxKeyPair::from_seed([9; 32]);
        let owner = Party::new(1);
        let ids = stored_credentials(
            &store,
            &issuer,
            "human-1",
            &owner.encryption_public_key(),
            &[b"one".as_slice(), b"two".as_slice()],
        )
        .await;

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        let stored = store.list_credentials_for("human-1").await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_sealed_credential_opens_for_owner() {
        let issuer = BoxKeyPair::from_seed([9; 32]);
        let owner = Party::new(1);
        let credential =
            sealed_credential(&issuer, "human-1", &owner.encryption_public_key(), b"hello");

        let sealed = SealedMessage::from_base64(&credential.content).unwrap().unwrap();
        let sender = BoxPublicKey::from_base64(&credential.encryption_public_key).unwrap();
        assert_eq!(sealed.open(&sender, owner.keys.secret_key()).unwrap(), b"hello");
    }
}
