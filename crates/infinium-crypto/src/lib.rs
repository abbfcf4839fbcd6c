//! secp256k1 primitives for the Infinium key-mining protocol.
//!
//! Three concerns live here, all pure and stateless:
//!
//! - **curve**: scalar-to-point derivation, point addition, and
//!   Ethereum-style address derivation (keccak256 of the uncompressed
//!   encoding, low 20 bytes).
//! - **signature**: 65-byte recoverable ECDSA over 32-byte prehashes.
//!   Solution checks and voucher checks both work by address recovery.
//! - **typed_data**: domain-separated struct hashing so off-chain signed
//!   messages are bound to one deployment and cannot be replayed against
//!   another.

pub mod curve;
pub mod signature;
pub mod typed_data;

pub use curve::{
    add, address_of, combine_scalars, public_key_of, scalar_from_entropy, Address, PublicPoint,
};
pub use signature::{keccak256, recover_address, sign_prehashed, RecoverableSignature};
pub use typed_data::{pad_address, typed_data_digest, u256_be, SigningDomain};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid scalar: must be in [1, curve order)")]
    InvalidScalar,

    #[error("invalid point: {0}")]
    InvalidPoint(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
