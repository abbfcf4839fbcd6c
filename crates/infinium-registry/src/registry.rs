use crate::error::{RegistryError, Result};
use crate::pool::{CollateralLock, Pool};
use crate::voucher::Voucher;
use async_trait::async_trait;
use infinium_crypto::{Address, RecoverableSignature, SigningDomain};
use infinium_pow::{PoolId, RewardSink, SinkError};
use infinium_token::{Amount, TokenLedger};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const FEE_DENOMINATOR: u16 = 10_000;

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Collateral locked per pool creation.
    pub amount_to_lock: Amount,
    /// Seconds after a pool closes before its collateral unlocks.
    pub unlock_delay_secs: i64,
    /// Domain the voucher scheme is bound to.
    pub domain: SigningDomain,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            amount_to_lock: Amount::from_inf(10_000),
            unlock_delay_secs: 7 * 24 * 60 * 60,
            domain: SigningDomain {
                name: "InfiniumPoolRegistry".to_string(),
                version: "1".to_string(),
                chain_id: 1,
                verifying_id: Address::ZERO,
            },
        }
    }
}

/// What a finalization produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// Paid immediately to the operator.
    pub pool_fee: Amount,
    /// Moved into the miner-claimable bucket.
    pub miners_share: Amount,
}

struct RegistryState {
    pools: HashMap<PoolId, Pool>,
    pool_by_owner: HashMap<Address, PoolId>,
    locks: HashMap<Address, CollateralLock>,
    claims: HashMap<(PoolId, Address), Amount>,
    next_pool_id: PoolId,
}

/// Pool registry and claim ledger. Like the engine, every operation does
/// its fallible work (checks, token movement) before mutating the record
/// state, so failures leave nothing behind.
pub struct PoolRegistry {
    ledger: Arc<TokenLedger>,
    /// The registry's custody account: collateral and pool reward sit here
    /// between lock and release.
    account: Address,
    config: RegistryConfig,
    state: Arc<RwLock<RegistryState>>,
}

impl PoolRegistry {
    pub fn new(ledger: Arc<TokenLedger>, account: Address, config: RegistryConfig) -> Self {
        Self {
            ledger,
            account,
            config,
            state: Arc::new(RwLock::new(RegistryState {
                pools: HashMap::new(),
                pool_by_owner: HashMap::new(),
                locks: HashMap::new(),
                claims: HashMap::new(),
                next_pool_id: 1,
            })),
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn domain(&self) -> &SigningDomain {
        &self.config.domain
    }

    pub fn amount_to_lock(&self) -> Amount {
        self.config.amount_to_lock
    }

    /// Creates a pool for `caller`, pulling the collateral through the
    /// caller's allowance. One active pool per owner; collateral from a
    /// previous pool must have been released first.
    pub async fn create_pool(
        &self,
        caller: Address,
        fee_bps: u16,
        name: String,
        url: String,
        now: i64,
    ) -> Result<PoolId> {
        // The zero address doubles as the closed-pool sentinel and can
        // never own a pool.
        if caller == Address::ZERO {
            return Err(RegistryError::ZeroAddress);
        }
        if fee_bps > FEE_DENOMINATOR {
            return Err(RegistryError::InvalidFee(fee_bps));
        }

        let mut state = self.state.write().await;
        if state.pool_by_owner.contains_key(&caller) {
            return Err(RegistryError::PoolAlreadyCreated);
        }
        if state.locks.contains_key(&caller) {
            return Err(RegistryError::CollateralStillLocked);
        }

        self.ledger
            .transfer_from(self.account, caller, self.account, self.config.amount_to_lock)
            .await
            .map_err(|e| RegistryError::Ledger(e.to_string()))?;

        let pool_id = state.next_pool_id;
        state.next_pool_id += 1;
        state.pools.insert(
            pool_id,
            Pool {
                owner: caller,
                voucher_signer: caller,
                fee_bps,
                name: name.clone(),
                url: url.clone(),
                last_activity: now,
                unfinalized_reward: Amount::ZERO,
                finalized_reward: Amount::ZERO,
                total_reward_issued: Amount::ZERO,
            },
        );
        state.pool_by_owner.insert(caller, pool_id);
        state.locks.insert(
            caller,
            CollateralLock {
                amount: self.config.amount_to_lock,
                pool_id,
            },
        );

        info!(
            pool_id = pool_id,
            owner = %caller,
            fee_bps = fee_bps,
            name = %name,
            url = %url,
            locked = %self.config.amount_to_lock,
            "🏊 Pool created"
        );
        Ok(pool_id)
    }

    /// Owner-only metadata/fee update on an active pool.
    pub async fn update_pool(
        &self,
        caller: Address,
        fee_bps: u16,
        name: String,
        url: String,
    ) -> Result<()> {
        if fee_bps > FEE_DENOMINATOR {
            return Err(RegistryError::InvalidFee(fee_bps));
        }

        let mut state = self.state.write().await;
        let pool_id = *state
            .pool_by_owner
            .get(&caller)
            .ok_or(RegistryError::NoActivePool)?;
        let pool = state
            .pools
            .get_mut(&pool_id)
            .ok_or(RegistryError::PoolNotFound(pool_id))?;

        pool.fee_bps = fee_bps;
        pool.name = name.clone();
        pool.url = url.clone();

        info!(pool_id = pool_id, fee_bps = fee_bps, name = %name, url = %url, "Pool updated");
        Ok(())
    }

    /// Closes the caller's active pool: the owner field is cleared, the
    /// close time stamped, and the unlock clock starts. Terminal.
    pub async fn close_pool(&self, caller: Address, now: i64) -> Result<PoolId> {
        let mut state = self.state.write().await;
        let pool_id = state
            .pool_by_owner
            .remove(&caller)
            .ok_or(RegistryError::NoActivePool)?;
        let pool = state
            .pools
            .get_mut(&pool_id)
            .ok_or(RegistryError::PoolNotFound(pool_id))?;

        pool.owner = Address::ZERO;
        pool.last_activity = now;

        info!(pool_id = pool_id, operator = %caller, "🔒 Pool closed");
        Ok(pool_id)
    }

    /// Releases the caller's collateral once the waiting period after the
    /// pool's close has elapsed.
    pub async fn unlock_collateral(&self, caller: Address, now: i64) -> Result<Amount> {
        let mut state = self.state.write().await;
        let lock = *state
            .locks
            .get(&caller)
            .ok_or(RegistryError::NothingLocked)?;
        let pool = state
            .pools
            .get(&lock.pool_id)
            .ok_or(RegistryError::PoolNotFound(lock.pool_id))?;

        if !pool.is_closed() || now < pool.last_activity + self.config.unlock_delay_secs {
            return Err(RegistryError::LockNotExpired);
        }

        self.ledger
            .transfer(self.account, caller, lock.amount)
            .await
            .map_err(|e| RegistryError::Ledger(e.to_string()))?;
        state.locks.remove(&caller);

        info!(pool_id = lock.pool_id, locker = %caller, amount = %lock.amount, "🔓 Collateral released");
        Ok(lock.amount)
    }

    /// Converts the pool's pending reward into a miner-claimable balance.
    /// The operator deducts `submits_cost` for off-chain infrastructure and
    /// is paid the basis-point fee on the remainder; the rest becomes
    /// claimable. Callable by the pool's voucher signer even after close.
    pub async fn finalize_reward(
        &self,
        caller: Address,
        pool_id: PoolId,
        submits_cost: Amount,
    ) -> Result<FinalizeOutcome> {
        let mut state = self.state.write().await;
        let pool = state
            .pools
            .get(&pool_id)
            .ok_or(RegistryError::PoolNotFound(pool_id))?;
        if pool.voucher_signer != caller {
            return Err(RegistryError::NotPoolOwner(pool_id));
        }

        let net = pool
            .unfinalized_reward
            .checked_sub(submits_cost)
            .ok_or_else(|| RegistryError::InsufficientReward {
                cost: submits_cost.to_string(),
                unfinalized: pool.unfinalized_reward.to_string(),
            })?;
        let pool_fee = net.mul_div(pool.fee_bps as u32, FEE_DENOMINATOR as u32);
        let miners_share = net.saturating_sub(pool_fee);

        self.ledger
            .transfer(self.account, caller, pool_fee)
            .await
            .map_err(|e| RegistryError::Ledger(e.to_string()))?;

        let pool = state
            .pools
            .get_mut(&pool_id)
            .ok_or(RegistryError::PoolNotFound(pool_id))?;
        // Bounded by token conservation: both buckets stay within the
        // fixed supply, so saturation never triggers in practice.
        pool.unfinalized_reward = Amount::ZERO;
        pool.finalized_reward = pool.finalized_reward.saturating_add(miners_share);
        pool.total_reward_issued = pool.total_reward_issued.saturating_add(miners_share);

        info!(
            pool_id = pool_id,
            submits_cost = %submits_cost,
            pool_fee = %pool_fee,
            miners_share = %miners_share,
            total_issued = %pool.total_reward_issued,
            "💰 Reward finalized"
        );
        Ok(FinalizeOutcome {
            pool_fee,
            miners_share,
        })
    }

    /// Redeems a cumulative voucher. Pays the increment over what the
    /// miner already claimed; the cumulative total must strictly increase,
    /// so replaying an old voucher pays nothing.
    pub async fn claim(
        &self,
        pool_id: PoolId,
        miner: Address,
        total_reward: Amount,
        signature: &RecoverableSignature,
    ) -> Result<Amount> {
        let mut state = self.state.write().await;
        let pool = state
            .pools
            .get(&pool_id)
            .ok_or(RegistryError::PoolNotFound(pool_id))?;

        let voucher = Voucher {
            pool_id,
            miner,
            total_reward,
        };
        let signer = voucher
            .recover_signer(&self.config.domain, signature)
            .map_err(|_| RegistryError::InvalidVoucherSignature)?;
        if signer != pool.voucher_signer {
            return Err(RegistryError::InvalidVoucherSignature);
        }

        let already = state
            .claims
            .get(&(pool_id, miner))
            .copied()
            .unwrap_or(Amount::ZERO);
        if total_reward == already {
            return Err(RegistryError::NothingToClaim);
        }
        let delta = total_reward
            .checked_sub(already)
            .ok_or(RegistryError::StaleVoucher)?;
        if delta > pool.finalized_reward {
            return Err(RegistryError::InsufficientFinalizedReward {
                delta: delta.to_string(),
                finalized: pool.finalized_reward.to_string(),
            });
        }

        self.ledger
            .transfer(self.account, miner, delta)
            .await
            .map_err(|e| RegistryError::Ledger(e.to_string()))?;

        let pool = state
            .pools
            .get_mut(&pool_id)
            .ok_or(RegistryError::PoolNotFound(pool_id))?;
        pool.finalized_reward = pool.finalized_reward.saturating_sub(delta);
        state.claims.insert((pool_id, miner), total_reward);

        info!(
            pool_id = pool_id,
            miner = %miner,
            total_reward = %total_reward,
            paid = %delta,
            "✅ Voucher claimed"
        );
        Ok(delta)
    }

    pub async fn pool_by_id(&self, pool_id: PoolId) -> Option<Pool> {
        self.state.read().await.pools.get(&pool_id).cloned()
    }

    pub async fn pool_id_of(&self, owner: Address) -> Option<PoolId> {
        self.state.read().await.pool_by_owner.get(&owner).copied()
    }

    pub async fn locked_collateral(&self, locker: Address) -> Amount {
        self.state
            .read()
            .await
            .locks
            .get(&locker)
            .map(|l| l.amount)
            .unwrap_or(Amount::ZERO)
    }

    pub async fn claimed_total(&self, pool_id: PoolId, miner: Address) -> Amount {
        self.state
            .read()
            .await
            .claims
            .get(&(pool_id, miner))
            .copied()
            .unwrap_or(Amount::ZERO)
    }
}

#[async_trait]
impl RewardSink for PoolRegistry {
    async fn pool_for(&self, recipient: Address) -> Option<PoolId> {
        self.pool_id_of(recipient).await
    }

    async fn notify_reward(
        &self,
        pool_id: PoolId,
        source: Address,
        amount: Amount,
        now: i64,
    ) -> std::result::Result<(), SinkError> {
        let mut state = self.state.write().await;
        // The pool may be closed: reward already earned must remain
        // creditable so it can still be finalized and claimed.
        let pool = state
            .pools
            .get(&pool_id)
            .ok_or_else(|| SinkError(format!("unknown pool {}", pool_id)))?;
        let credited = pool
            .unfinalized_reward
            .checked_add(amount)
            .ok_or_else(|| SinkError("unfinalized reward overflow".to_string()))?;

        self.ledger
            .transfer(source, self.account, amount)
            .await
            .map_err(|e| SinkError(e.to_string()))?;

        if let Some(pool) = state.pools.get_mut(&pool_id) {
            pool.unfinalized_reward = credited;
            // A closed pool's timestamp is its close time and anchors the
            // collateral unlock clock; a late credit must not move it.
            if !pool.is_closed() {
                pool.last_activity = now;
            }
        }

        debug!(pool_id = pool_id, amount = %amount, "Reward credited to pool");
        Ok(())
    }
}
