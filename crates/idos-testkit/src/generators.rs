//! Proptest generators for property-based testing.

use proptest::prelude::*;

use idos_core::Grant;
use idos_perms::BoxKeyPair;

/// An EVM address in mixed case.
pub fn evm_address() -> impl Strategy<Value = String> {
    "0x[0-9a-fA-F]{40}".prop_map(String::from)
}

/// A NEAR account name on mainnet or testnet.
pub fn near_address() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,24}\\.(near|testnet)".prop_map(String::from)
}

/// Something shaped like an XRPL classic address. The checksum is not valid.
pub fn xrpl_address() -> impl Strategy<Value = String> {
    "r[1-9A-HJ-NP-Za-km-z]{24,34}".prop_map(String::from)
}

/// Something shaped like a Stellar account id. The checksum is not valid.
pub fn stellar_address() -> impl Strategy<Value = String> {
    "G[A-Z2-7]{55}".prop_map(String::from)
}

/// An address of any supported chain.
pub fn any_address() -> impl Strategy<Value = String> {
    prop_oneof![
        evm_address(),
        near_address(),
        xrpl_address(),
        stellar_address(),
    ]
}

/// A unix timestamp in seconds, zero included.
pub fn timestamp() -> impl Strategy<Value = u64> {
    prop_oneof![Just(0u64), 1u64..=4_102_444_800]
}

/// Plaintext bytes of at most `max_len`.
pub fn plaintext(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// A box key pair from a random seed.
pub fn box_key_pair() -> impl Strategy<Value = BoxKeyPair> {
    any::<[u8; 32]>().prop_map(BoxKeyPair::from_seed)
}

/// A grant with a random grantee, lock and optional data id.
pub fn grant() -> impl Strategy<Value = Grant> {
    (
        "[a-z0-9]{8}",
        any_address(),
        timestamp(),
        proptest::option::of("[a-z0-9]{8}"),
    )
        .prop_map(|(id, grantee, locked_until, data_id)| {
            let grant = Grant::new(id, grantee, locked_until);
            match data_id {
                Some(data_id) => grant.with_data(data_id),
                None => grant,
            }
        })
}
