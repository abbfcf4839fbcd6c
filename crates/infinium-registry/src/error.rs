use infinium_pow::PoolId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("caller already has an active pool")]
    PoolAlreadyCreated,

    #[error("caller has no active pool")]
    NoActivePool,

    #[error("caller still has locked collateral from a previous pool")]
    CollateralStillLocked,

    #[error("pool not found: {0}")]
    PoolNotFound(PoolId),

    #[error("caller does not operate pool {0}")]
    NotPoolOwner(PoolId),

    #[error("fee {0} exceeds 10000 basis points")]
    InvalidFee(u16),

    #[error("zero address is not a valid caller")]
    ZeroAddress,

    #[error("collateral lock has not expired yet")]
    LockNotExpired,

    #[error("caller has no locked collateral")]
    NothingLocked,

    #[error("submits cost {cost} exceeds unfinalized reward {unfinalized}")]
    InsufficientReward { cost: String, unfinalized: String },

    #[error("voucher total equals the amount already claimed")]
    NothingToClaim,

    #[error("voucher total is below the amount already claimed")]
    StaleVoucher,

    #[error("claim delta {delta} exceeds finalized reward {finalized}")]
    InsufficientFinalizedReward { delta: String, finalized: String },

    #[error("voucher signature does not recover to the pool's signer")]
    InvalidVoucherSignature,

    #[error("ledger error: {0}")]
    Ledger(String),
}
