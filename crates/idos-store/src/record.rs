//! Untyped records and the filters that select them.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use idos_core::normalize_address;

use crate::error::{Result, StoreError};

/// A record as the store sees it: a JSON object with a string `id`.
pub type Record = serde_json::Map<String, Value>;

/// The tables the kernel reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Credentials,
    AccessGrants,
    Wallets,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Credentials, Table::AccessGrants, Table::Wallets];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Table::Credentials => "credentials",
            Table::AccessGrants => "access_grants",
            Table::Wallets => "wallets",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| StoreError::InvalidRecord(format!("unknown table: {s}")))
    }
}

/// The `id` of a record, if it has a non-empty string one.
pub fn record_id(record: &Record) -> Option<&str> {
    record
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Return the record's id, assigning a fresh UUID if it has none.
pub(crate) fn ensure_id(record: &mut Record) -> Result<String> {
    match record.get("id") {
        None | Some(Value::Null) => {}
        Some(Value::String(id)) if !id.is_empty() => return Ok(id.clone()),
        Some(Value::String(_)) => {}
        Some(other) => {
            return Err(StoreError::InvalidRecord(format!(
                "id must be a string, got {other}"
            )))
        }
    }
    let id = uuid::Uuid::new_v4().to_string();
    record.insert("id".into(), Value::String(id.clone()));
    Ok(id)
}

/// Whether `record` may be returned from a shared lookup.
///
/// Credentials are only reachable this way through their shared copies.
pub(crate) fn is_shared(table: Table, record: &Record) -> bool {
    match table {
        Table::Credentials => record
            .get("originalId")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty()),
        Table::AccessGrants | Table::Wallets => true,
    }
}

/// Convert a typed value into a record.
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidRecord(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Convert a record into a typed value.
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Eq(String, Value),
    Address(String, String),
}

/// Conjunction of field conditions. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value` exactly.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Eq(field.into(), value.into()));
        self
    }

    /// Require `field` to hold the same wallet address as `address`.
    ///
    /// Both sides are normalized, so EVM checksum casing does not matter.
    pub fn address(mut self, field: impl Into<String>, address: &str) -> Self {
        self.clauses
            .push(Clause::Address(field.into(), canonical_address(address)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The normalized address required for `field`, if the filter has one.
    pub fn address_for(&self, field: &str) -> Option<&str> {
        self.clauses.iter().find_map(|clause| match clause {
            Clause::Address(f, address) if f == field => Some(address.as_str()),
            _ => None,
        })
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|clause| match clause {
            Clause::Eq(field, value) => record.get(field) == Some(value),
            Clause::Address(field, address) => record
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|stored| canonical_address(stored) == *address),
        })
    }
}

/// Normalized form of an address, or the trimmed text if it has no known format.
pub(crate) fn canonical_address(address: &str) -> String {
    normalize_address(address).unwrap_or_else(|_| address.trim().to_string())
}
