use async_trait::async_trait;
use infinium_crypto::Address;
use infinium_token::Amount;
use thiserror::Error;

pub type PoolId = u64;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// The narrow capability through which the engine routes rewards to a pool
/// registry. The registry implements this and is handed to the engine at
/// construction; no caller-identity check is needed because only the
/// engine ever holds the capability.
#[async_trait]
pub trait RewardSink: Send + Sync {
    /// The active pool owned by `recipient`, if any.
    async fn pool_for(&self, recipient: Address) -> Option<PoolId>;

    /// Moves `amount` from `source` into the registry's custody and
    /// credits the pool's unfinalized reward bucket. All-or-nothing.
    async fn notify_reward(
        &self,
        pool_id: PoolId,
        source: Address,
        amount: Amount,
        now: i64,
    ) -> std::result::Result<(), SinkError>;
}

/// A sink with no pools: every reward is paid directly to its recipient.
#[derive(Debug, Clone, Default)]
pub struct NoPools;

#[async_trait]
impl RewardSink for NoPools {
    async fn pool_for(&self, _recipient: Address) -> Option<PoolId> {
        None
    }

    async fn notify_reward(
        &self,
        pool_id: PoolId,
        _source: Address,
        _amount: Amount,
        _now: i64,
    ) -> std::result::Result<(), SinkError> {
        Err(SinkError(format!("unknown pool {}", pool_id)))
    }
}
