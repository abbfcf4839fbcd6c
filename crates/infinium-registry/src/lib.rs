//! Mining pool registry.
//!
//! Pools are collateral-gated: creating one locks a fixed INF amount that
//! is released only after the pool is closed and a waiting period elapses.
//! The PoW engine credits pool rewards through the [`RewardSink`]
//! capability; operators convert the accumulated unfinalized reward into a
//! miner-claimable balance (minus a fee and an off-chain-cost deduction)
//! and hand out cumulative signed vouchers that miners redeem
//! incrementally through [`PoolRegistry::claim`].
//!
//! [`RewardSink`]: infinium_pow::RewardSink

pub mod error;
pub mod pool;
pub mod registry;
pub mod voucher;

pub use error::{RegistryError, Result};
pub use pool::{CollateralLock, Pool};
pub use registry::{FinalizeOutcome, PoolRegistry, RegistryConfig};
pub use voucher::Voucher;
