use crate::signature::keccak256;
use crate::{CryptoError, Result};
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::{Field, PrimeField};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 20-byte account identifier, the low 160 bits of the keccak256 hash of
/// an uncompressed public point encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Byte-wise XOR, used by the proof-of-work acceptance test.
    pub fn xor(&self, mask: &[u8; 20]) -> [u8; 20] {
        let mut out = [0u8; 20];
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.0[i] ^ mask[i];
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A public point on secp256k1. Never the point at infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicPoint(AffinePoint);

impl PublicPoint {
    /// Builds a point from affine coordinates, rejecting anything that does
    /// not satisfy the curve equation.
    pub fn from_coordinates(x: [u8; 32], y: [u8; 32]) -> Result<Self> {
        let encoded = EncodedPoint::from_affine_coordinates(
            &FieldBytes::from(x),
            &FieldBytes::from(y),
            false,
        );
        let point = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or_else(|| CryptoError::InvalidPoint("coordinates are not on the curve".into()))?;
        Ok(Self(point))
    }

    pub fn x(&self) -> [u8; 32] {
        let encoded = self.0.to_encoded_point(false);
        let mut out = [0u8; 32];
        out.copy_from_slice(&encoded.as_bytes()[1..33]);
        out
    }

    pub fn y(&self) -> [u8; 32] {
        let encoded = self.0.to_encoded_point(false);
        let mut out = [0u8; 32];
        out.copy_from_slice(&encoded.as_bytes()[33..65]);
        out
    }

    /// The 64-byte uncompressed encoding (x ‖ y, no SEC1 tag).
    pub fn to_uncompressed(&self) -> [u8; 64] {
        let encoded = self.0.to_encoded_point(false);
        let mut out = [0u8; 64];
        out.copy_from_slice(&encoded.as_bytes()[1..65]);
        out
    }
}

fn parse_scalar(bytes: &[u8; 32]) -> Result<Scalar> {
    let scalar = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*bytes)))
        .ok_or(CryptoError::InvalidScalar)?;
    if bool::from(scalar.is_zero()) {
        return Err(CryptoError::InvalidScalar);
    }
    Ok(scalar)
}

/// Derives the public point of a private scalar by base-point
/// multiplication. Fails on 0 or anything at or above the curve order.
pub fn public_key_of(scalar: &[u8; 32]) -> Result<PublicPoint> {
    let scalar = parse_scalar(scalar)?;
    let point = (ProjectivePoint::GENERATOR * scalar).to_affine();
    Ok(PublicPoint(point))
}

/// Elliptic-curve point addition, doubling included. A sum landing on the
/// point at infinity is rejected since the identity is invalid input
/// everywhere downstream.
pub fn add(p1: &PublicPoint, p2: &PublicPoint) -> Result<PublicPoint> {
    let sum = ProjectivePoint::from(p1.0) + ProjectivePoint::from(p2.0);
    if sum == ProjectivePoint::IDENTITY {
        return Err(CryptoError::InvalidPoint(
            "sum is the point at infinity".into(),
        ));
    }
    Ok(PublicPoint(sum.to_affine()))
}

/// Hashes the 64-byte uncompressed encoding and keeps the low 20 bytes.
pub fn address_of(point: &PublicPoint) -> Address {
    let digest = keccak256(&point.to_uncompressed());
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..32]);
    Address(out)
}

/// (a + b) mod curve order. Both operands and the sum must be valid private
/// scalars; a sum of zero (b ≡ −a) is rejected.
pub fn combine_scalars(a: &[u8; 32], b: &[u8; 32]) -> Result<[u8; 32]> {
    let a = parse_scalar(a)?;
    let b = parse_scalar(b)?;
    let sum = a + b;
    if bool::from(sum.is_zero()) {
        return Err(CryptoError::InvalidScalar);
    }
    Ok(sum.to_bytes().into())
}

/// Reduces 32 bytes of entropy into a valid private scalar in [1, n).
/// The zero residue is mapped to one so the result is always usable.
pub fn scalar_from_entropy(entropy: &[u8; 32]) -> [u8; 32] {
    let scalar = <Scalar as Reduce<k256::U256>>::reduce_bytes(&FieldBytes::from(*entropy));
    if bool::from(scalar.is_zero()) {
        return Scalar::ONE.to_bytes().into();
    }
    scalar.to_bytes().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(n: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = n;
        bytes
    }

    // n - 1 for secp256k1
    const ORDER_MINUS_ONE: [u8; 32] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36,
        0x41, 0x40,
    ];

    #[test]
    fn test_known_addresses() {
        // Well-known addresses for private keys 1 and 2
        let addr1 = address_of(&public_key_of(&scalar(1)).unwrap());
        assert_eq!(
            addr1.to_string(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );

        let addr2 = address_of(&public_key_of(&scalar(2)).unwrap());
        assert_eq!(
            addr2.to_string(),
            "0x2b5ad5c4795c026514f8317c7a215e218dccd6cf"
        );
    }

    #[test]
    fn test_generator_coordinates() {
        let g = public_key_of(&scalar(1)).unwrap();
        assert_eq!(
            hex::encode(g.x()),
            "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            hex::encode(g.y()),
            "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
    }

    #[test]
    fn test_scalar_validation() {
        assert_eq!(
            public_key_of(&[0u8; 32]).unwrap_err(),
            CryptoError::InvalidScalar
        );
        // The curve order itself is out of range
        let mut order = ORDER_MINUS_ONE;
        order[31] += 1;
        assert_eq!(
            public_key_of(&order).unwrap_err(),
            CryptoError::InvalidScalar
        );
        assert!(public_key_of(&ORDER_MINUS_ONE).is_ok());
    }

    #[test]
    fn test_addition_matches_scalar_sum() {
        let pa = public_key_of(&scalar(11)).unwrap();
        let pb = public_key_of(&scalar(31)).unwrap();
        let sum = add(&pa, &pb).unwrap();

        let combined = combine_scalars(&scalar(11), &scalar(31)).unwrap();
        assert_eq!(sum, public_key_of(&combined).unwrap());
    }

    #[test]
    fn test_doubling() {
        let g = public_key_of(&scalar(1)).unwrap();
        let doubled = add(&g, &g).unwrap();
        assert_eq!(doubled, public_key_of(&scalar(2)).unwrap());
    }

    #[test]
    fn test_addition_rejects_infinity() {
        // pub(1) + pub(n-1) = identity
        let g = public_key_of(&scalar(1)).unwrap();
        let neg = public_key_of(&ORDER_MINUS_ONE).unwrap();
        assert!(matches!(
            add(&g, &neg).unwrap_err(),
            CryptoError::InvalidPoint(_)
        ));
    }

    #[test]
    fn test_combine_rejects_zero_sum() {
        assert_eq!(
            combine_scalars(&scalar(1), &ORDER_MINUS_ONE).unwrap_err(),
            CryptoError::InvalidScalar
        );
    }

    #[test]
    fn test_off_curve_point_rejected() {
        let mut one = [0u8; 32];
        one[31] = 1;
        assert!(PublicPoint::from_coordinates(one, one).is_err());
    }

    #[test]
    fn test_coordinate_round_trip() {
        let p = public_key_of(&scalar(7)).unwrap();
        let rebuilt = PublicPoint::from_coordinates(p.x(), p.y()).unwrap();
        assert_eq!(p, rebuilt);
        // address derivation is deterministic
        assert_eq!(address_of(&p), address_of(&rebuilt));
    }

    #[test]
    fn test_scalar_from_entropy_is_valid() {
        assert!(public_key_of(&scalar_from_entropy(&[0u8; 32])).is_ok());
        assert!(public_key_of(&scalar_from_entropy(&[0xff; 32])).is_ok());
    }
}
