//! Key-mining proof of work.
//!
//! A miner searches for a private scalar B such that the address derived
//! from `pointA + pointB`, where `pointA` is the public point of a
//! protocol-held scalar A, XORed with a magic constant falls under the
//! current difficulty threshold. The miner proves control of `A + B` by
//! signing `keccak256(recipient ‖ data)` with the combined scalar, which
//! simultaneously binds the solution to a recipient (no front-running) and
//! never reveals B.
//!
//! The engine owns the rotating puzzle state, verifies submissions with
//! O(1) curve operations, pays rewards from its treasury account, and
//! rotates the puzzle every fixed number of accepted submissions. Payment
//! routing to mining pools goes through the [`RewardSink`] capability
//! injected at construction; the engine itself knows nothing about pool
//! bookkeeping.

pub mod difficulty;
pub mod engine;
pub mod error;
pub mod puzzle;
pub mod schedule;
pub mod sink;

pub use difficulty::{Difficulty, DifficultyPolicy, EpochRetarget, FixedDifficulty};
pub use engine::{PowConfig, PowEngine, SubmissionReceipt};
pub use error::{PowError, Result};
pub use puzzle::{PuzzleState, RotationTrigger, EPOCH_LENGTH, MAGIC_XOR};
pub use schedule::{FixedReward, RewardSchedule, SupplyDecaySchedule};
pub use sink::{NoPools, PoolId, RewardSink, SinkError};
