//! SQLite implementation of the Store trait.
//!
//! Record bodies are stored as CBOR in a single `records` table. Uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::record::{canonical_address, ensure_id, is_shared, Filter, Record, Table};
use crate::traits::{already_exists, not_found, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Lock(format!("mutex poisoned: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn encode_body(record: &Record) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(record, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_body(bytes: &[u8]) -> Result<Record> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Indexed grantee for a grant record.
fn grantee_column(table: Table, record: &Record) -> Option<String> {
    if table != Table::AccessGrants {
        return None;
    }
    record
        .get("grantee")
        .and_then(|v| v.as_str())
        .map(canonical_address)
}

fn get_body(conn: &Connection, table: Table, id: &str) -> Result<Option<Record>> {
    let body: Option<Vec<u8>> = conn
        .query_row(
            "SELECT body FROM records WHERE tbl = ?1 AND id = ?2",
            params![table.as_str(), id],
            |row| row.get(0),
        )
        .optional()?;
    body.map(|b| decode_body(&b)).transpose()
}

#[async_trait]
impl Store for SqliteStore {
    async fn list(&self, table: Table, filter: &Filter) -> Result<Vec<Record>> {
        let filter = filter.clone();

        let rows = self
            .run(move |conn| {
                let bodies: Vec<Vec<u8>> = match filter.address_for("grantee") {
                    Some(grantee) if table == Table::AccessGrants => {
                        let mut stmt = conn.prepare(
                            "SELECT body FROM records WHERE tbl = ?1 AND grantee = ?2 ORDER BY seq",
                        )?;
                        let rows = stmt
                            .query_map(params![table.as_str(), grantee], |row| row.get(0))?
                            .collect::<rusqlite::Result<Vec<_>>>()?;
                        rows
                    }
                    _ => {
                        let mut stmt =
                            conn.prepare("SELECT body FROM records WHERE tbl = ?1 ORDER BY seq")?;
                        let rows = stmt
                            .query_map(params![table.as_str()], |row| row.get(0))?
                            .collect::<rusqlite::Result<Vec<_>>>()?;
                        rows
                    }
                };

                let mut records = Vec::with_capacity(bodies.len());
                for body in bodies {
                    let record = decode_body(&body)?;
                    if filter.matches(&record) {
                        records.push(record);
                    }
                }
                Ok(records)
            })
            .await?;

        debug!(%table, count = rows.len(), "listed records");
        Ok(rows)
    }

    async fn create(&self, table: Table, mut record: Record) -> Result<Record> {
        let id = ensure_id(&mut record)?;
        let body = encode_body(&record)?;
        let grantee = grantee_column(table, &record);

        let inserted_id = id.clone();
        self.run(move |conn| {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT seq FROM records WHERE tbl = ?1 AND id = ?2",
                    params![table.as_str(), inserted_id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_some() {
                return Err(already_exists(table, &inserted_id));
            }

            conn.execute(
                "INSERT INTO records (tbl, id, body, created_at, grantee) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![table.as_str(), inserted_id, body, now_millis(), grantee],
            )?;
            Ok(())
        })
        .await?;

        debug!(%table, %id, "created record");
        Ok(record)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        let id = id.to_string();
        let deleted_id = id.clone();

        self.run(move |conn| {
            let changed = conn.execute(
                "DELETE FROM records WHERE tbl = ?1 AND id = ?2",
                params![table.as_str(), deleted_id],
            )?;
            if changed == 0 {
                return Err(not_found(table, &deleted_id));
            }
            Ok(())
        })
        .await?;

        debug!(%table, %id, "deleted record");
        Ok(())
    }

    async fn get(&self, table: Table, id: &str) -> Result<Option<Record>> {
        let id = id.to_string();
        self.run(move |conn| get_body(conn, table, &id)).await
    }

    async fn get_shared(&self, table: Table, id: &str) -> Result<Option<Record>> {
        Ok(self.get(table, id).await?.filter(|r| is_shared(table, r)))
    }
}
