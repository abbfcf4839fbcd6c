//! The INF token: a single-ledger fungible balance system used for mining
//! rewards and pool collateral. Standard transfer / approve / transfer_from
//! semantics with a fixed maximum supply minted once at genesis.

pub mod ledger;
pub mod types;

pub use ledger::TokenLedger;
pub use types::Amount;
