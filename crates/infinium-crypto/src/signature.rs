use crate::curve::Address;
use crate::{CryptoError, Result};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::FieldBytes;
use sha3::{Digest, Keccak256};

/// keccak256 of an arbitrary byte string.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// A 65-byte r ‖ s ‖ v recoverable ECDSA signature over a 32-byte prehash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableSignature([u8; 65]);

impl RecoverableSignature {
    /// Parses a 65-byte signature. Recovery bytes 27/28 are normalized to
    /// 0/1 for compatibility with Ethereum-style tooling.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 65 {
            return Err(CryptoError::InvalidSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; 65];
        out.copy_from_slice(bytes);
        if out[64] >= 27 {
            out[64] -= 27;
        }
        if out[64] > 1 {
            return Err(CryptoError::InvalidSignature(format!(
                "invalid recovery byte {}",
                bytes[64]
            )));
        }
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }
}

/// Signs a 32-byte prehash with a private scalar, producing a recoverable
/// signature whose recovered address is the scalar's derived address.
pub fn sign_prehashed(secret: &[u8; 32], digest: &[u8; 32]) -> Result<RecoverableSignature> {
    let key = SigningKey::from_bytes(&FieldBytes::from(*secret))
        .map_err(|_| CryptoError::InvalidScalar)?;
    let (sig, recid) = key
        .sign_prehash_recoverable(digest)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = recid.to_byte();
    Ok(RecoverableSignature(out))
}

/// Recovers the signing address from a prehash and a recoverable signature.
pub fn recover_address(digest: &[u8; 32], signature: &RecoverableSignature) -> Result<Address> {
    let sig = Signature::from_slice(&signature.0[..64])
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let recid = RecoveryId::from_byte(signature.0[64])
        .ok_or_else(|| CryptoError::InvalidSignature("invalid recovery byte".into()))?;
    let key = VerifyingKey::recover_from_prehash(digest, &sig, recid)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let encoded = key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..65]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Ok(Address::from_bytes(addr))
}
