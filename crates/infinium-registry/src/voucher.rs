use infinium_crypto::{
    keccak256, pad_address, recover_address, sign_prehashed, typed_data_digest, u256_be, Address,
    CryptoError, RecoverableSignature, SigningDomain,
};
use infinium_pow::PoolId;
use infinium_token::Amount;
use serde::{Deserialize, Serialize};

const VOUCHER_TYPE: &[u8] = b"Voucher(uint256 poolId,address miner,uint256 totalReward)";

/// An off-chain signed statement of a miner's cumulative reward
/// entitlement in a pool. The operator reissues vouchers with a growing
/// `total_reward`; each redemption pays only the increment since the last
/// one, so replaying an old voucher gains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub pool_id: PoolId,
    pub miner: Address,
    pub total_reward: Amount,
}

impl Voucher {
    fn struct_hash(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(32 * 4);
        buf.extend_from_slice(&keccak256(VOUCHER_TYPE));
        buf.extend_from_slice(&u256_be(self.pool_id as u128));
        buf.extend_from_slice(&pad_address(&self.miner));
        buf.extend_from_slice(&u256_be(self.total_reward.to_base_units()));
        keccak256(&buf)
    }

    /// The digest the pool operator signs, bound to one registry
    /// deployment through the domain separator.
    pub fn digest(&self, domain: &SigningDomain) -> [u8; 32] {
        typed_data_digest(domain, &self.struct_hash())
    }

    /// Operator-side helper: issues the signed voucher.
    pub fn sign(
        &self,
        domain: &SigningDomain,
        operator_secret: &[u8; 32],
    ) -> Result<RecoverableSignature, CryptoError> {
        sign_prehashed(operator_secret, &self.digest(domain))
    }

    pub fn recover_signer(
        &self,
        domain: &SigningDomain,
        signature: &RecoverableSignature,
    ) -> Result<Address, CryptoError> {
        recover_address(&self.digest(domain), signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infinium_crypto::{address_of, public_key_of};

    fn domain() -> SigningDomain {
        SigningDomain {
            name: "InfiniumPoolRegistry".into(),
            version: "1".into(),
            chain_id: 1,
            verifying_id: Address::from_bytes([0x42; 20]),
        }
    }

    fn secret(n: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = n;
        bytes
    }

    #[test]
    fn test_sign_and_recover() {
        let voucher = Voucher {
            pool_id: 1,
            miner: Address::from_bytes([5; 20]),
            total_reward: Amount::from_inf(45),
        };
        let sig = voucher.sign(&domain(), &secret(9)).unwrap();
        let signer = voucher.recover_signer(&domain(), &sig).unwrap();
        assert_eq!(signer, address_of(&public_key_of(&secret(9)).unwrap()));
    }

    #[test]
    fn test_digest_binds_every_field() {
        let base = Voucher {
            pool_id: 1,
            miner: Address::from_bytes([5; 20]),
            total_reward: Amount::from_inf(45),
        };
        let d = base.digest(&domain());

        let mut v = base;
        v.pool_id = 2;
        assert_ne!(v.digest(&domain()), d);

        let mut v = base;
        v.miner = Address::from_bytes([6; 20]);
        assert_ne!(v.digest(&domain()), d);

        let mut v = base;
        v.total_reward = Amount::from_inf(46);
        assert_ne!(v.digest(&domain()), d);

        let mut other_domain = domain();
        other_domain.chain_id = 5;
        assert_ne!(base.digest(&other_domain), d);
    }

    #[test]
    fn test_signature_from_other_domain_recovers_differently() {
        let voucher = Voucher {
            pool_id: 1,
            miner: Address::from_bytes([5; 20]),
            total_reward: Amount::from_inf(45),
        };
        let mut other = domain();
        other.verifying_id = Address::from_bytes([0x43; 20]);

        let sig = voucher.sign(&other, &secret(9)).unwrap();
        let expected = address_of(&public_key_of(&secret(9)).unwrap());
        match voucher.recover_signer(&domain(), &sig) {
            Ok(addr) => assert_ne!(addr, expected),
            Err(_) => {}
        }
    }
}
