//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::record::{ensure_id, is_shared, record_id, Filter, Record, Table};
use crate::traits::{already_exists, not_found, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    /// Records per table, in insertion order.
    tables: RwLock<HashMap<Table, Vec<Record>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a table.
    pub fn count(&self, table: Table) -> usize {
        self.read()
            .map(|tables| tables.get(&table).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Table, Vec<Record>>>> {
        self.tables
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Table, Vec<Record>>>> {
        self.tables
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn find(&self, table: Table, id: &str) -> Result<Option<Record>> {
        let tables = self.read()?;
        Ok(tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|r| record_id(r) == Some(id)))
            .cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list(&self, table: Table, filter: &Filter) -> Result<Vec<Record>> {
        let tables = self.read()?;
        let rows: Vec<Record> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();

        debug!(%table, count = rows.len(), "listed records");
        Ok(rows)
    }

    async fn create(&self, table: Table, mut record: Record) -> Result<Record> {
        let id = ensure_id(&mut record)?;
        let mut tables = self.write()?;
        let rows = tables.entry(table).or_default();

        if rows.iter().any(|r| record_id(r) == Some(id.as_str())) {
            return Err(already_exists(table, &id));
        }
        rows.push(record.clone());

        debug!(%table, %id, "created record");
        Ok(record)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        let mut tables = self.write()?;
        let rows = tables.entry(table).or_default();

        let pos = rows
            .iter()
            .position(|r| record_id(r) == Some(id))
            .ok_or_else(|| not_found(table, id))?;
        rows.remove(pos);

        debug!(%table, %id, "deleted record");
        Ok(())
    }

    async fn get(&self, table: Table, id: &str) -> Result<Option<Record>> {
        self.find(table, id)
    }

    async fn get_shared(&self, table: Table, id: &str) -> Result<Option<Record>> {
        Ok(self.find(table, id)?.filter(|r| is_shared(table, r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use idos_core::{Credential, Grant, Wallet};
    use serde_json::json;

    fn credential(id: &str, original_id: Option<&str>) -> Credential {
        Credential {
            id: id.into(),
            owner_id: "h-1".into(),
            issuer_id: "issuer".into(),
            content: "c2VhbGVk".into(),
            encryption_public_key: "cGs=".into(),
            public_notes: None,
            original_id: original_id.map(Into::into),
            shares: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let store = MemoryStore::new();
        let grant = store
            .create_grant(&Grant::new("", "alice.near", 0))
            .await
            .unwrap();

        assert!(!grant.id.is_empty());
        assert_eq!(store.get_grant(&grant.id).await.unwrap(), Some(grant));
        assert_eq!(store.count(Table::AccessGrants), 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        store.create_grant(&Grant::new("g-1", "alice.near", 0)).await.unwrap();
        let err = store
            .create_grant(&Grant::new("g-1", "bob.near", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_list_grants_for() {
        let store = MemoryStore::new();
        let evm = "0xAbCdEf0123456789aBcDeF0123456789ABCDEF01";
        store.create_grant(&Grant::new("g-1", "alice.near", 0)).await.unwrap();
        store.create_grant(&Grant::new("g-2", evm, 0)).await.unwrap();
        store.create_grant(&Grant::new("g-3", "alice.near", 5)).await.unwrap();

        let ids: Vec<_> = store
            .list_grants_for("alice.near")
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids, ["g-1", "g-3"]);

        let evm_grants = store.list_grants_for(&evm.to_ascii_lowercase()).await.unwrap();
        assert_eq!(evm_grants.len(), 1);
        assert!(store.list_grants_for("bob.near").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revoke_deletes() {
        let store = MemoryStore::new();
        store.create_grant(&Grant::new("g-1", "alice.near", 0)).await.unwrap();

        store.revoke_grant("g-1").await.unwrap();
        assert!(store.get_grant("g-1").await.unwrap().is_none());
        assert!(matches!(
            store.revoke_grant("g-1").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_shared_only_returns_copies() {
        let store = MemoryStore::new();
        store.create_credential(&credential("c-1", None)).await.unwrap();
        store.create_credential(&credential("c-2", Some("c-1"))).await.unwrap();

        assert!(store.get_shared_credential("c-1").await.unwrap().is_none());
        assert!(store.get_credential("c-1").await.unwrap().is_some());

        let copy = store.get_shared_credential("c-2").await.unwrap().unwrap();
        assert_eq!(copy.original_id.as_deref(), Some("c-1"));
        assert_eq!(store.list_credentials_for("h-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_wallets_by_human() {
        let store = MemoryStore::new();
        store.create_wallet(&Wallet::new("alice.near", "h-1").unwrap()).await.unwrap();
        store.create_wallet(&Wallet::new("bob.near", "h-2").unwrap()).await.unwrap();

        let wallets = store.list_wallets("h-1").await.unwrap();
        assert_eq!(wallets.len(), 1);
        assert_eq!(wallets[0].address, "alice.near");
    }

    #[tokio::test]
    async fn test_untyped_records() {
        let store = MemoryStore::new();
        let record = object(json!({ "id": "w-1", "address": "alice.near" }));
        store.create(Table::Wallets, record).await.unwrap();

        let listed = store.list(Table::Wallets, &Filter::all()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(store.list(Table::Credentials, &Filter::all()).await.unwrap().is_empty());
        store.delete(Table::Wallets, "w-1").await.unwrap();
        assert_eq!(store.count(Table::Wallets), 0);
    }

    fn object(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }
}
