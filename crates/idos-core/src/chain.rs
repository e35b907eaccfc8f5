//! Wallet address classification.
//!
//! Maps an address string to the chain whose format it matches. The chain tag
//! is never trusted from storage: callers recompute it from the address every
//! time they need it.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::UnsupportedAddressError;

/// The ledger an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainTag {
    Evm,
    Near,
    Xrpl,
    Stellar,
}

impl ChainTag {
    /// All chain tags, in classification priority order.
    pub const ALL: [ChainTag; 4] = CLASSIFICATION_ORDER;

    /// The wire name of this tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChainTag::Evm => "evm",
            ChainTag::Near => "near",
            ChainTag::Xrpl => "xrpl",
            ChainTag::Stellar => "stellar",
        }
    }

    /// Whether `address` matches this chain's address format.
    pub fn matches(&self, address: &str) -> bool {
        pattern(*self).is_match(address)
    }
}

impl fmt::Display for ChainTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainTag {
    type Err = UnsupportedAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "evm" => Ok(ChainTag::Evm),
            "near" => Ok(ChainTag::Near),
            "xrpl" => Ok(ChainTag::Xrpl),
            "stellar" => Ok(ChainTag::Stellar),
            other => Err(UnsupportedAddressError(other.to_string())),
        }
    }
}

/// Priority in which address formats are tried.
///
/// The formats are disjoint today; the order only starts to matter if a
/// pattern is loosened, and tests pin it.
pub const CLASSIFICATION_ORDER: [ChainTag; 4] =
    [ChainTag::Evm, ChainTag::Near, ChainTag::Xrpl, ChainTag::Stellar];

const EVM_PATTERN: &str = r"^0x[0-9a-fA-F]{40}$";
const NEAR_PATTERN: &str = r"^[a-zA-Z0-9._-]+\.(near|testnet|betanet)$";
const XRPL_PATTERN: &str = r"^r[1-9A-HJ-NP-Za-km-z]{24,34}$";
const STELLAR_PATTERN: &str = r"^G[A-Z2-7]{55}$";

fn pattern(tag: ChainTag) -> &'static Regex {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [EVM_PATTERN, NEAR_PATTERN, XRPL_PATTERN, STELLAR_PATTERN]
            .map(|p| Regex::new(p).expect("static address pattern is valid"))
    });
    match tag {
        ChainTag::Evm => &patterns[0],
        ChainTag::Near => &patterns[1],
        ChainTag::Xrpl => &patterns[2],
        ChainTag::Stellar => &patterns[3],
    }
}

/// Classify an address by format.
pub fn classify(address: &str) -> Result<ChainTag, UnsupportedAddressError> {
    CLASSIFICATION_ORDER
        .into_iter()
        .find(|tag| tag.matches(address))
        .ok_or_else(|| UnsupportedAddressError(address.to_string()))
}

/// Classify and canonicalize an address for use as an identity.
///
/// EVM and NEAR addresses are case-insensitive and lowered. XRPL and
/// Stellar encodings are case-significant and returned as-is.
pub fn normalize_address(address: &str) -> Result<String, UnsupportedAddressError> {
    let trimmed = address.trim();
    match classify(trimmed)? {
        ChainTag::Evm | ChainTag::Near => Ok(trimmed.to_ascii_lowercase()),
        ChainTag::Xrpl | ChainTag::Stellar => Ok(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_chain() {
        assert_eq!(classify(&format!("0x{}", "a".repeat(40))), Ok(ChainTag::Evm));
        assert_eq!(classify("alice.near"), Ok(ChainTag::Near));
        assert_eq!(classify("bob_1-x.testnet"), Ok(ChainTag::Near));
        assert_eq!(classify("carol.betanet"), Ok(ChainTag::Near));
        assert_eq!(classify(&format!("r{}", "N".repeat(25))), Ok(ChainTag::Xrpl));
        assert_eq!(classify(&format!("G{}", "A".repeat(55))), Ok(ChainTag::Stellar));
    }

    #[test]
    fn test_classify_unsupported() {
        let err = classify("not-an-address").unwrap_err();
        assert_eq!(err, UnsupportedAddressError("not-an-address".into()));

        assert!(classify("").is_err());
        // EVM with wrong length
        assert!(classify(&format!("0x{}", "a".repeat(39))).is_err());
        // NEAR with an unknown suffix
        assert!(classify("alice.eth").is_err());
        // XRPL containing a non-base58 character
        assert!(classify(&format!("r0{}", "N".repeat(24))).is_err());
        // XRPL too short
        assert!(classify(&format!("r{}", "N".repeat(23))).is_err());
        // Stellar with lowercase
        assert!(classify(&format!("G{}", "a".repeat(55))).is_err());
        // Stellar wrong length
        assert!(classify(&format!("G{}", "A".repeat(54))).is_err());
    }

    #[test]
    fn test_classification_order_is_pinned() {
        assert_eq!(
            CLASSIFICATION_ORDER,
            [ChainTag::Evm, ChainTag::Near, ChainTag::Xrpl, ChainTag::Stellar]
        );
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        // Every address matches exactly one format, so classification equals
        // the first tag in priority order whose pattern matches.
        let samples = [
            format!("0x{}", "b".repeat(40)),
            "alice.near".to_string(),
            format!("r{}", "p".repeat(30)),
            format!("G{}", "7".repeat(55)),
        ];
        for sample in &samples {
            let matching: Vec<_> = CLASSIFICATION_ORDER
                .iter()
                .filter(|t| t.matches(sample))
                .collect();
            assert_eq!(matching.len(), 1, "{sample} matched {matching:?}");
            assert_eq!(classify(sample).unwrap(), *matching[0]);
        }
    }

    #[test]
    fn test_normalize_address() {
        let mixed = "0xAbCdEf0123456789aBcDeF0123456789ABCDEF01";
        assert_eq!(normalize_address(mixed).unwrap(), mixed.to_ascii_lowercase());
        assert_eq!(normalize_address(" Alice.near ").unwrap(), "alice.near");

        let xrpl = format!("rPq{}", "N".repeat(22));
        assert_eq!(normalize_address(&xrpl).unwrap(), xrpl);

        assert!(normalize_address("nope").is_err());
    }

    #[test]
    fn test_chain_tag_wire_names() {
        for tag in ChainTag::ALL {
            assert_eq!(tag.as_str().parse::<ChainTag>().unwrap(), tag);
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag));
        }
        assert!("solana".parse::<ChainTag>().is_err());
    }
}
