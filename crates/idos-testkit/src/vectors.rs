//! Known-answer vectors.
//!
//! Addresses and digests that any implementation of the wallet formats must
//! reproduce byte for byte.

/// An EVM secret key and the checksummed address it controls.
#[derive(Debug, Clone)]
pub struct EvmAddressVector {
    pub secret_hex: &'static str,
    pub address: &'static str,
}

/// A public key and the XRPL classic address derived from it.
#[derive(Debug, Clone)]
pub struct XrplAddressVector {
    pub name: &'static str,
    pub public_key_hex: &'static str,
    pub address: &'static str,
}

/// A message and its expected signing digest on one chain.
#[derive(Debug, Clone)]
pub struct DigestVector {
    pub name: &'static str,
    pub message: &'static [u8],
    pub digest_hex: &'static str,
}

pub fn evm_address_vectors() -> Vec<EvmAddressVector> {
    vec![
        EvmAddressVector {
            secret_hex: "0000000000000000000000000000000000000000000000000000000000000001",
            address: "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
        },
        EvmAddressVector {
            secret_hex: "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
            address: "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
        },
    ]
}

pub fn xrpl_address_vectors() -> Vec<XrplAddressVector> {
    vec![XrplAddressVector {
        name: "genesis account",
        public_key_hex: "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020",
        address: "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
    }]
}

/// EIP-191 personal message digest.
pub fn evm_digest_vectors() -> Vec<DigestVector> {
    vec![DigestVector {
        name: "hello",
        message: b"hello",
        digest_hex: "50b2c43fd39106bafbba0da34fc430e1f91e3c96ea2acee2bc34119f92b37750",
    }]
}

/// XRPL SHA-512Half.
pub fn xrpl_digest_vectors() -> Vec<DigestVector> {
    vec![DigestVector {
        name: "hello",
        message: b"hello",
        digest_hex: "9b71d224bd62f3785d96d46ad3ea3d73319bfbc2890caadae2dff72519673ca7",
    }]
}

/// Stellar SEP-53 signed message digest.
pub fn stellar_digest_vectors() -> Vec<DigestVector> {
    vec![DigestVector {
        name: "hello",
        message: b"hello",
        digest_hex: "d07e093383bf1c99f5efeeaceeee9b4c3ffcdfff25c43717679eb6d6f0f896b0",
    }]
}

/// The Stellar account id of the all-zero public key.
pub const STELLAR_ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

#[cfg(test)]
mod tests {
    use super::*;
    use idos_signer::{evm, stellar, xrpl, EvmSigner, Signer};

    #[test]
    fn test_evm_addresses() {
        for vector in evm_address_vectors() {
            let secret = hex::decode(vector.secret_hex).unwrap();
            let signer = EvmSigner::from_bytes(&secret).unwrap();
            assert_eq!(signer.address(), vector.address);
            assert_eq!(evm::to_checksum_address(&vector.address.to_lowercase()), vector.address);
        }
    }

    #[test]
    fn test_xrpl_addresses() {
        for vector in xrpl_address_vectors() {
            let public_key = hex::decode(vector.public_key_hex).unwrap();
            assert_eq!(
                xrpl::address_from_public_key(&public_key),
                vector.address,
                "{}",
                vector.name
            );
        }
    }

    #[test]
    fn test_digests() {
        for vector in evm_digest_vectors() {
            assert_eq!(hex::encode(evm::eip191_digest(vector.message)), vector.digest_hex);
        }
        for vector in xrpl_digest_vectors() {
            assert_eq!(hex::encode(xrpl::sha512_half(vector.message)), vector.digest_hex);
        }
        for vector in stellar_digest_vectors() {
            assert_eq!(
                hex::encode(stellar::message_digest(vector.message)),
                vector.digest_hex
            );
        }
    }

    #[test]
    fn test_stellar_zero_account() {
        assert_eq!(stellar::encode_account(&[0; 32]), STELLAR_ZERO_ACCOUNT);
        assert_eq!(stellar::decode_account(STELLAR_ZERO_ACCOUNT), Some([0; 32]));

        let mut tampered = STELLAR_ZERO_ACCOUNT.to_string();
        tampered.replace_range(10..11, "B");
        assert_eq!(stellar::decode_account(&tampered), None);
    }
}
