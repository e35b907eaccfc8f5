//! Store trait: the abstract interface to the record database.
//!
//! The kernel never talks to a database directly. It reads and writes
//! untyped records through [`Store`], and the typed helpers in [`StoreExt`]
//! fix the record shapes and filters used by the grant and credential flows.

use async_trait::async_trait;

use idos_core::{Credential, Grant, Wallet};

use crate::error::{Result, StoreError};
use crate::record::{from_record, to_record, Filter, Record, Table};

/// Async interface to a record store.
///
/// Records are created and deleted, never updated in place.
#[async_trait]
pub trait Store: Send + Sync {
    /// List the records of `table` matching `filter`, in insertion order.
    async fn list(&self, table: Table, filter: &Filter) -> Result<Vec<Record>>;

    /// Insert a record, assigning an `id` if it has none.
    ///
    /// Returns the record as stored. Fails with `AlreadyExists` if the id is
    /// taken.
    async fn create(&self, table: Table, record: Record) -> Result<Record>;

    /// Delete a record by id. Fails with `NotFound` if it does not exist.
    async fn delete(&self, table: Table, id: &str) -> Result<()>;

    /// Get any record by id.
    async fn get(&self, table: Table, id: &str) -> Result<Option<Record>>;

    /// Get a record that was shared with the caller.
    ///
    /// For credentials only shared copies are returned; an original
    /// credential looked up this way is `None`.
    async fn get_shared(&self, table: Table, id: &str) -> Result<Option<Record>>;
}

/// Typed helpers over [`Store`].
pub trait StoreExt: Store {
    /// Grants whose grantee is `grantee`, compared in normalized form.
    fn list_grants_for(
        &self,
        grantee: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Grant>>> + Send;

    fn get_grant(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Grant>>> + Send;

    fn create_grant(
        &self,
        grant: &Grant,
    ) -> impl std::future::Future<Output = Result<Grant>> + Send;

    /// Revoke a grant by deleting it.
    fn revoke_grant(&self, id: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    fn create_credential(
        &self,
        credential: &Credential,
    ) -> impl std::future::Future<Output = Result<Credential>> + Send;

    fn get_credential(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Credential>>> + Send;

    fn get_shared_credential(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Credential>>> + Send;

    /// Credentials owned by a human, originals and shared copies alike.
    fn list_credentials_for(
        &self,
        owner_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Credential>>> + Send;

    fn list_wallets(
        &self,
        human_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Wallet>>> + Send;

    fn create_wallet(
        &self,
        wallet: &Wallet,
    ) -> impl std::future::Future<Output = Result<Wallet>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn list_grants_for(&self, grantee: &str) -> Result<Vec<Grant>> {
        let filter = Filter::all().address("grantee", grantee);
        self.list(Table::AccessGrants, &filter)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    async fn get_grant(&self, id: &str) -> Result<Option<Grant>> {
        self.get(Table::AccessGrants, id)
            .await?
            .map(from_record)
            .transpose()
    }

    async fn create_grant(&self, grant: &Grant) -> Result<Grant> {
        let record = to_record(grant)?;
        from_record(self.create(Table::AccessGrants, record).await?)
    }

    async fn revoke_grant(&self, id: &str) -> Result<()> {
        self.delete(Table::AccessGrants, id).await
    }

    async fn create_credential(&self, credential: &Credential) -> Result<Credential> {
        let record = to_record(credential)?;
        from_record(self.create(Table::Credentials, record).await?)
    }

    async fn get_credential(&self, id: &str) -> Result<Option<Credential>> {
        self.get(Table::Credentials, id)
            .await?
            .map(from_record)
            .transpose()
    }

    async fn get_shared_credential(&self, id: &str) -> Result<Option<Credential>> {
        self.get_shared(Table::Credentials, id)
            .await?
            .map(from_record)
            .transpose()
    }

    async fn list_credentials_for(&self, owner_id: &str) -> Result<Vec<Credential>> {
        let filter = Filter::all().eq("userId", owner_id);
        self.list(Table::Credentials, &filter)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    async fn list_wallets(&self, human_id: &str) -> Result<Vec<Wallet>> {
        let filter = Filter::all().eq("humanId", human_id);
        self.list(Table::Wallets, &filter)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    async fn create_wallet(&self, wallet: &Wallet) -> Result<Wallet> {
        let record = to_record(wallet)?;
        from_record(self.create(Table::Wallets, record).await?)
    }
}

/// `NotFound` for a record id.
pub(crate) fn not_found(table: Table, id: &str) -> StoreError {
    StoreError::NotFound {
        table: table.to_string(),
        id: id.to_string(),
    }
}

/// `AlreadyExists` for a record id.
pub(crate) fn already_exists(table: Table, id: &str) -> StoreError {
    StoreError::AlreadyExists {
        table: table.to_string(),
        id: id.to_string(),
    }
}
