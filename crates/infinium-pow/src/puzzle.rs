use crate::difficulty::{Difficulty, DifficultyPolicy};
use infinium_crypto::{scalar_from_entropy, Address};
use infinium_token::Amount;
use serde::{Deserialize, Serialize};

/// XOR mask applied to solution addresses before the difficulty
/// comparison.
pub const MAGIC_XOR: [u8; 20] = [0x88; 20];

/// Accepted submissions per epoch before the puzzle rotates.
pub const EPOCH_LENGTH: u32 = 100;

/// One live puzzle configuration. The secret scalar is deliberately
/// readable through the engine: the puzzle's security rests on the size of
/// the search space, not on keeping scalar A hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleState {
    pub secret_scalar_a: [u8; 32],
    pub difficulty: Difficulty,
    pub epoch_nonce: u64,
    pub submissions_in_epoch: u32,
    pub reward_amount: Amount,
    pub epoch_started_at: i64,
}

/// What caused a rotation: the close timestamp plus entropy drawn from the
/// closing submission.
#[derive(Debug, Clone)]
pub struct RotationTrigger {
    pub now: i64,
    pub entropy: [u8; 32],
}

impl PuzzleState {
    pub fn genesis(seed: &[u8; 32], difficulty: Difficulty, now: i64) -> Self {
        Self {
            secret_scalar_a: scalar_from_entropy(blake3::hash(seed).as_bytes()),
            difficulty,
            epoch_nonce: 0,
            submissions_in_epoch: 0,
            reward_amount: Amount::ZERO,
            epoch_started_at: now,
        }
    }

    /// The proof-of-work acceptance test: `(addr XOR MAGIC) < difficulty`.
    pub fn meets_difficulty(&self, address: &Address) -> bool {
        self.difficulty.admits(&address.xor(&MAGIC_XOR))
    }

    /// Pure rotation: derives the successor puzzle without touching `self`.
    /// New scalar, new threshold, bumped nonce, and a zeroed counter all
    /// change together; the reward is carried over and re-set by the
    /// caller's schedule.
    pub fn rotated(&self, trigger: &RotationTrigger, policy: &dyn DifficultyPolicy) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.secret_scalar_a);
        hasher.update(&self.epoch_nonce.to_le_bytes());
        hasher.update(&trigger.entropy);
        let next_scalar = scalar_from_entropy(hasher.finalize().as_bytes());

        let observed = trigger.now - self.epoch_started_at;
        Self {
            secret_scalar_a: next_scalar,
            difficulty: policy.next_difficulty(&self.difficulty, observed),
            epoch_nonce: self.epoch_nonce + 1,
            submissions_in_epoch: 0,
            reward_amount: self.reward_amount,
            epoch_started_at: trigger.now,
        }
    }
}
