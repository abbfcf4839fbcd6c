use crate::curve::Address;
use crate::signature::keccak256;
use serde::{Deserialize, Serialize};

const DOMAIN_TYPEHASH_INPUT: &[u8] =
    b"SigningDomain(string name,string version,uint256 chainId,address verifyingContract)";

/// Identifies one deployment of a signing scheme. Signatures under one
/// domain never verify under another, which is what makes off-chain
/// vouchers replay-safe across chains and deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_id: Address,
}

impl SigningDomain {
    pub fn separator(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(32 * 5);
        buf.extend_from_slice(&keccak256(DOMAIN_TYPEHASH_INPUT));
        buf.extend_from_slice(&keccak256(self.name.as_bytes()));
        buf.extend_from_slice(&keccak256(self.version.as_bytes()));
        buf.extend_from_slice(&u256_be(self.chain_id as u128));
        buf.extend_from_slice(&pad_address(&self.verifying_id));
        keccak256(&buf)
    }
}

/// Final digest for a struct hash under a domain, with the standard
/// `0x19 0x01` typed-data prefix.
pub fn typed_data_digest(domain: &SigningDomain, struct_hash: &[u8; 32]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(2 + 64);
    buf.extend_from_slice(&[0x19, 0x01]);
    buf.extend_from_slice(&domain.separator());
    buf.extend_from_slice(struct_hash);
    keccak256(&buf)
}

/// A u128 encoded as a big-endian 32-byte word.
pub fn u256_be(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

/// An address left-padded to a 32-byte word.
pub fn pad_address(address: &Address) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(address.as_bytes());
    out
}
