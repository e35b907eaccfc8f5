//! Indexed view over grants read from the store.
//!
//! The store decides which grants are returned; this module answers questions
//! about them without further I/O. Grantee addresses are compared in
//! normalized form so that EVM checksum casing does not hide a grant.

use std::collections::HashMap;

use idos_core::{normalize_address, Grant};

use crate::grant::is_usable;

/// An immutable set of grants indexed by grantee and data id.
#[derive(Debug, Default, Clone)]
pub struct GrantSet {
    /// All grants, in the order they were read.
    grants: Vec<Grant>,

    /// Index: normalized grantee -> positions in `grants`.
    by_grantee: HashMap<String, Vec<usize>>,

    /// Index: data id -> positions in `grants`.
    by_data: HashMap<String, Vec<usize>>,
}

impl GrantSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set, skipping grants whose grantee is not a known address.
    pub fn from_grants(grants: impl IntoIterator<Item = Grant>) -> Self {
        let mut set = Self::new();
        for grant in grants {
            set.insert(grant);
        }
        set
    }

    fn insert(&mut self, grant: Grant) {
        let Ok(grantee) = normalize_address(&grant.grantee) else {
            return;
        };

        let pos = self.grants.len();
        self.by_grantee.entry(grantee).or_default().push(pos);
        if let Some(data_id) = &grant.data_id {
            self.by_data.entry(data_id.clone()).or_default().push(pos);
        }
        self.grants.push(grant);
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grant> {
        self.grants.iter()
    }

    /// Get a grant by id.
    pub fn get(&self, grant_id: &str) -> Option<&Grant> {
        self.grants.iter().find(|g| g.id == grant_id)
    }

    /// All grants for a grantee.
    pub fn for_grantee(&self, grantee: &str) -> Vec<&Grant> {
        let Ok(grantee) = normalize_address(grantee) else {
            return Vec::new();
        };
        self.by_grantee
            .get(&grantee)
            .map(|positions| positions.iter().map(|&i| &self.grants[i]).collect())
            .unwrap_or_default()
    }

    /// Grants for a grantee that are usable at `now`.
    pub fn usable_for(&self, grantee: &str, now: u64) -> Vec<&Grant> {
        self.for_grantee(grantee)
            .into_iter()
            .filter(|g| is_usable(g, now))
            .collect()
    }

    /// All grants covering a data id.
    pub fn for_data(&self, data_id: &str) -> Vec<&Grant> {
        self.by_data
            .get(data_id)
            .map(|positions| positions.iter().map(|&i| &self.grants[i]).collect())
            .unwrap_or_default()
    }

    /// A grant usable by `grantee` at `now` that covers `data_id`, if any.
    pub fn usable_for_data(&self, grantee: &str, data_id: &str, now: u64) -> Option<&Grant> {
        self.usable_for(grantee, now)
            .into_iter()
            .find(|g| g.data_id.as_deref() == Some(data_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVM: &str = "0xAbCdEf0123456789aBcDeF0123456789ABCDEF01";

    fn sample() -> GrantSet {
        GrantSet::from_grants([
            Grant::new("g-1", "alice.near", 0).with_data("c-1"),
            Grant::new("g-2", "alice.near", 2_000_000_000).with_data("c-2"),
            Grant::new("g-3", EVM, 0).with_data("c-3"),
            Grant::new("g-4", "not an address", 0).with_data("c-4"),
        ])
    }

    #[test]
    fn test_for_grantee() {
        let set = sample();
        assert_eq!(set.len(), 3);

        let ids: Vec<_> = set.for_grantee("alice.near").iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["g-1", "g-2"]);
        assert!(set.for_grantee("bob.near").is_empty());
        assert!(set.for_grantee("garbage").is_empty());
    }

    #[test]
    fn test_evm_lookup_ignores_case() {
        let set = sample();
        assert_eq!(set.for_grantee(&EVM.to_ascii_lowercase()).len(), 1);
        assert_eq!(set.for_grantee(&EVM.to_ascii_uppercase().replacen("0X", "0x", 1)).len(), 1);
    }

    #[test]
    fn test_usable_for() {
        let set = sample();
        let ids: Vec<_> = set
            .usable_for("alice.near", 1_000_000_000)
            .iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(ids, ["g-1"]);
        assert_eq!(set.usable_for("alice.near", 2_000_000_000).len(), 2);
    }

    #[test]
    fn test_usable_for_data() {
        let set = sample();
        assert_eq!(
            set.usable_for_data("alice.near", "c-1", 0).map(|g| g.id.as_str()),
            Some("g-1")
        );
        assert!(set.usable_for_data("alice.near", "c-2", 1_000_000_000).is_none());
        assert!(set.usable_for_data("alice.near", "c-3", 0).is_none());
        assert_eq!(set.for_data("c-2").len(), 1);
        assert!(set.for_data("c-4").is_empty());
    }

    #[test]
    fn test_get() {
        let set = sample();
        assert_eq!(set.get("g-3").unwrap().grantee, EVM);
        assert!(set.get("g-4").is_none());
    }
}
