use infinium_crypto::Address;
use infinium_pow::PoolId;
use infinium_token::Amount;
use serde::{Deserialize, Serialize};

/// One mining pool record. `owner` is zeroed when the pool closes; the
/// `voucher_signer` set at creation survives closing so reward already in
/// the registry's custody stays finalizable by the operator and claimable
/// by miners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub owner: Address,
    pub voucher_signer: Address,
    pub fee_bps: u16,
    pub name: String,
    pub url: String,
    pub last_activity: i64,
    /// Credited by the PoW engine, not yet processed.
    pub unfinalized_reward: Amount,
    /// Processed and available for miner claims.
    pub finalized_reward: Amount,
    /// Cumulative reward ever finalized; the voucher domain. Never
    /// decreases.
    pub total_reward_issued: Amount,
}

impl Pool {
    pub fn is_closed(&self) -> bool {
        self.owner == Address::ZERO
    }
}

/// Collateral held for a pool creator, keyed by the locker so it outlives
/// the pool record's cleared owner field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralLock {
    pub amount: Amount,
    pub pool_id: PoolId,
}
