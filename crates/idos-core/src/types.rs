//! Record shapes exchanged with the store.
//!
//! Records are plain values. They are created and deleted, never edited in
//! place: a changed credential is a new record, a revoked grant is a deleted
//! one.

use serde::{Deserialize, Serialize};

use crate::chain::{classify, normalize_address, ChainTag};
use crate::codec;
use crate::error::{CoreError, Result, UnsupportedAddressError};

/// An encrypted credential.
///
/// `content` is a base64 sealed message and is only meaningful together with
/// `encryption_public_key`, the sender key it was sealed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: String,

    /// Owner (human) identifier.
    #[serde(rename = "userId")]
    pub owner_id: String,

    /// Issuer identifier.
    #[serde(rename = "issuerAuthPublicKey")]
    pub issuer_id: String,

    /// Base64 `nonce || ciphertext`.
    pub content: String,

    /// Base64 public key of the sealing party.
    pub encryption_public_key: String,

    /// Cleartext JSON metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_notes: Option<String>,

    /// For a shared copy, the credential it was copied from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shares: Vec<String>,
}

impl Credential {
    /// Whether this record is a copy made for a grantee.
    pub fn is_shared_copy(&self) -> bool {
        self.original_id.is_some()
    }

    /// Parse `public_notes` as JSON, if present.
    pub fn public_notes_json(&self) -> Result<Option<serde_json::Value>> {
        self.public_notes
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| CoreError::InvalidRecord(format!("public notes: {e}")))
    }

    /// SHA-256 hex of the sealed content, used to detect duplicates.
    pub fn content_hash(&self) -> String {
        codec::content_hash(self.content.as_bytes())
    }
}

/// An access grant from a data owner to a grantee.
///
/// `locked_until` is in Unix seconds; `0` means usable immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    pub id: String,

    /// Grantee wallet address.
    pub grantee: String,

    pub locked_until: u64,

    /// Owner wallet address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Id of the shared credential this grant covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_id: Option<String>,
}

impl Grant {
    /// A grant with no owner or data reference.
    pub fn new(id: impl Into<String>, grantee: impl Into<String>, locked_until: u64) -> Self {
        Self {
            id: id.into(),
            grantee: grantee.into(),
            locked_until,
            owner: None,
            data_id: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_data(mut self, data_id: impl Into<String>) -> Self {
        self.data_id = Some(data_id.into());
        self
    }

    /// The grantee address, normalized.
    pub fn grantee_normalized(&self) -> std::result::Result<String, UnsupportedAddressError> {
        normalize_address(&self.grantee)
    }
}

/// A wallet linked to a human identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub address: String,

    pub human_id: String,

    /// Stored for display. Use [`Wallet::chain`] for anything that matters.
    pub wallet_type: String,

    /// Hex public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    /// The message signed to prove ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Hex signature over `message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Wallet {
    /// A wallet record for `address`, with `wallet_type` filled from its format.
    pub fn new(
        address: impl Into<String>,
        human_id: impl Into<String>,
    ) -> std::result::Result<Self, UnsupportedAddressError> {
        let address = address.into();
        let chain = classify(&address)?;
        Ok(Self {
            address,
            human_id: human_id.into(),
            wallet_type: chain.to_string(),
            public_key: None,
            message: None,
            signature: None,
        })
    }

    /// Chain tag recomputed from the address.
    pub fn chain(&self) -> std::result::Result<ChainTag, UnsupportedAddressError> {
        classify(&self.address)
    }

    /// Whether the stored `wallet_type` disagrees with the address format.
    pub fn has_stale_type(&self) -> bool {
        match self.chain() {
            Ok(chain) => chain.as_str() != self.wallet_type,
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grant_record_shape() {
        let value = json!({ "grantee": "alice.near", "id": "g-1", "lockedUntil": 1700000000 });
        let grant: Grant = serde_json::from_value(value).unwrap();
        assert_eq!(grant, Grant::new("g-1", "alice.near", 1_700_000_000));

        let back = serde_json::to_value(&grant).unwrap();
        assert_eq!(back["lockedUntil"], 1_700_000_000);
        assert!(back.get("dataId").is_none());
    }

    #[test]
    fn test_wallet_record_shape() {
        let value = json!({
            "address": "alice.near",
            "humanId": "h-1",
            "walletType": "near",
            "publicKey": "00ff",
        });
        let wallet: Wallet = serde_json::from_value(value).unwrap();
        assert_eq!(wallet.human_id, "h-1");
        assert_eq!(wallet.public_key.as_deref(), Some("00ff"));
        assert_eq!(wallet.chain().unwrap(), ChainTag::Near);
    }

    #[test]
    fn test_wallet_chain_is_recomputed() {
        let mut wallet = Wallet::new("alice.near", "h-1").unwrap();
        assert_eq!(wallet.wallet_type, "near");
        assert!(!wallet.has_stale_type());

        // A spoofed stored type does not change the derived chain.
        wallet.wallet_type = "evm".into();
        assert_eq!(wallet.chain().unwrap(), ChainTag::Near);
        assert!(wallet.has_stale_type());
    }

    #[test]
    fn test_credential_notes_and_hash() {
        let credential = Credential {
            id: "c-1".into(),
            owner_id: "h-1".into(),
            issuer_id: "issuer".into(),
            content: "abc".into(),
            encryption_public_key: "pk".into(),
            public_notes: Some(r#"{"type":"KYC"}"#.into()),
            original_id: None,
            shares: vec![],
        };
        assert_eq!(credential.public_notes_json().unwrap().unwrap()["type"], "KYC");
        assert_eq!(
            credential.content_hash(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(!credential.is_shared_copy());

        let json = serde_json::to_value(&credential).unwrap();
        assert_eq!(json["userId"], "h-1");
        assert_eq!(json["encryptionPublicKey"], "pk");
    }
}
