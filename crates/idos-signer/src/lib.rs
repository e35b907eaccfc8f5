//! # idOS Signer
//!
//! Wallet signing and signature verification across four chains.
//!
//! | Chain   | Key        | Signed bytes                                  | Key source        |
//! |---------|------------|-----------------------------------------------|-------------------|
//! | EVM     | secp256k1  | Keccak-256 of the EIP-191 personal message    | recovered         |
//! | NEAR    | ed25519    | raw message                                   | carried, resolved |
//! | XRPL    | either     | SHA-512Half (secp256k1) or raw (ed25519)      | carried           |
//! | Stellar | ed25519    | SHA-256 of the SEP-53 signed message          | decoded from addr |
//!
//! Verification never errors: malformed input, a wrong key, or an address of
//! another chain all yield `false`.
//!
//! The chain of an address is always derived from the address itself with
//! [`idos_core::classify`]. [`SignerRegistry`] dispatches on that tag.
//!
//! A NEAR signature is only as good as the claim that its key belongs to the
//! account. [`NearVerifier`] asks a [`NearKeyResolver`] and rejects when none
//! is configured.

pub mod error;
pub mod evm;
pub mod near;
pub mod registry;
pub mod signer;
pub mod stellar;
pub mod xrpl;

pub use error::{Result, SignerError};
pub use evm::{EvmSigner, EvmVerifier};
pub use near::{KnownNearKeys, NearKeyResolver, NearSigner, NearVerifier, NoNearKeys};
pub use registry::SignerRegistry;
pub use signer::{ChainVerifier, Signer, WalletSignature};
pub use stellar::{StellarSigner, StellarVerifier};
pub use xrpl::{XrplSigner, XrplVerifier};
