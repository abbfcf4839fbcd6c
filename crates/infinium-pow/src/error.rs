use infinium_crypto::{Address, CryptoError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PowError>;

#[derive(Debug, Error)]
pub enum PowError {
    #[error("mining is not active")]
    MiningNotActive,

    #[error("mining already started")]
    MiningAlreadyActive,

    #[error("caller {0} is not the engine owner")]
    NotOwner(Address),

    #[error("recipient address is zero")]
    ZeroRecipient,

    #[error("solution address {address} does not meet the current difficulty")]
    DifficultyNotMet { address: Address },

    #[error("signature does not recover to the solution address")]
    InvalidSignature,

    #[error("solution already submitted")]
    AlreadySubmitted,

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("reward sink error: {0}")]
    Sink(String),
}
