use crate::difficulty::{Difficulty, DifficultyPolicy};
use crate::error::{PowError, Result};
use crate::puzzle::{PuzzleState, RotationTrigger, EPOCH_LENGTH};
use crate::schedule::RewardSchedule;
use crate::sink::{PoolId, RewardSink};
use infinium_crypto::{
    add, address_of, keccak256, public_key_of, recover_address, Address, PublicPoint,
    RecoverableSignature,
};
use infinium_token::{Amount, TokenLedger};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PowConfig {
    /// Accepted submissions per epoch before rotation.
    pub epoch_length: u32,
    pub initial_difficulty: Difficulty,
    /// Seeds the genesis secret scalar.
    pub chain_seed: [u8; 32],
}

impl Default for PowConfig {
    fn default() -> Self {
        let mut initial = [0u8; 20];
        initial[0] = 0x80;
        Self {
            epoch_length: EPOCH_LENGTH,
            initial_difficulty: Difficulty::from_bytes(initial),
            chain_seed: [0u8; 32],
        }
    }
}

/// What an accepted submission produced.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub solution_address: Address,
    pub reward: Amount,
    pub epoch_nonce: u64,
    pub routed_pool: Option<PoolId>,
}

struct EngineState {
    mining_active: bool,
    puzzle: PuzzleState,
    /// Public point of the current secret scalar, refreshed on rotation.
    point_a: PublicPoint,
    /// Spent-markers of accepted solutions, keyed by
    /// blake3(pointB ‖ signature).
    spent: HashSet<[u8; 32]>,
}

/// The proof-of-work arbiter. One logical operation runs at a time behind
/// the state lock; every operation performs its fallible steps before any
/// mutation, so a returned error implies no observable state change.
pub struct PowEngine {
    ledger: Arc<TokenLedger>,
    /// The engine's own funding account: rewards are paid out of it.
    treasury: Address,
    admin: Address,
    sink: Arc<dyn RewardSink>,
    policy: Box<dyn DifficultyPolicy>,
    schedule: Box<dyn RewardSchedule>,
    config: PowConfig,
    state: Arc<RwLock<EngineState>>,
}

impl PowEngine {
    pub fn new(
        ledger: Arc<TokenLedger>,
        treasury: Address,
        admin: Address,
        sink: Arc<dyn RewardSink>,
        policy: Box<dyn DifficultyPolicy>,
        schedule: Box<dyn RewardSchedule>,
        config: PowConfig,
        now: i64,
    ) -> Result<Self> {
        let puzzle = PuzzleState::genesis(&config.chain_seed, config.initial_difficulty, now);
        let point_a = public_key_of(&puzzle.secret_scalar_a)?;
        Ok(Self {
            ledger,
            treasury,
            admin,
            sink,
            policy,
            schedule,
            config,
            state: Arc::new(RwLock::new(EngineState {
                mining_active: false,
                puzzle,
                point_a,
                spent: HashSet::new(),
            })),
        })
    }

    /// One-time admin action: opens mining and sets the initial reward.
    pub async fn start_mining(
        &self,
        caller: Address,
        initial_reward: Amount,
        now: i64,
    ) -> Result<()> {
        if caller != self.admin {
            return Err(PowError::NotOwner(caller));
        }
        let mut state = self.state.write().await;
        if state.mining_active {
            return Err(PowError::MiningAlreadyActive);
        }
        state.mining_active = true;
        state.puzzle.reward_amount = initial_reward;
        state.puzzle.epoch_started_at = now;

        info!(
            reward = %initial_reward,
            difficulty = %state.puzzle.difficulty,
            "🚀 Mining started"
        );
        Ok(())
    }

    /// The message a solution signature must cover: binds the found scalar
    /// to one recipient and payload so a third party cannot re-submit the
    /// solution for themselves.
    pub fn solution_digest(recipient: &Address, data: &[u8]) -> [u8; 32] {
        let mut buf = Vec::with_capacity(20 + data.len());
        buf.extend_from_slice(recipient.as_bytes());
        buf.extend_from_slice(data);
        keccak256(&buf)
    }

    /// Verifies and pays one submission, rotating the puzzle if this one
    /// closes the epoch. Rotation is bundled atomically with the closing
    /// submission: it is scored entirely against the old parameters and the
    /// successor state becomes visible in the same operation.
    pub async fn submit(
        &self,
        recipient: Address,
        point_b: PublicPoint,
        signature: RecoverableSignature,
        data: &[u8],
        now: i64,
    ) -> Result<SubmissionReceipt> {
        if recipient == Address::ZERO {
            return Err(PowError::ZeroRecipient);
        }

        let mut state = self.state.write().await;
        if !state.mining_active {
            return Err(PowError::MiningNotActive);
        }

        // Replay gate before any scoring: a spent solution must fail the
        // same way even after the puzzle it solved has rotated away.
        let marker = Self::spent_marker(&point_b, &signature);
        if state.spent.contains(&marker) {
            return Err(PowError::AlreadySubmitted);
        }

        let combined = add(&state.point_a, &point_b)?;
        let solution_address = address_of(&combined);
        if !state.puzzle.meets_difficulty(&solution_address) {
            debug!(address = %solution_address, difficulty = %state.puzzle.difficulty, "Difficulty not met");
            return Err(PowError::DifficultyNotMet {
                address: solution_address,
            });
        }

        let digest = Self::solution_digest(&recipient, data);
        let signer =
            recover_address(&digest, &signature).map_err(|_| PowError::InvalidSignature)?;
        if signer != solution_address {
            return Err(PowError::InvalidSignature);
        }

        let reward = state.puzzle.reward_amount;
        let epoch_nonce = state.puzzle.epoch_nonce;
        let closes_epoch = state.puzzle.submissions_in_epoch + 1 >= self.config.epoch_length;

        // Precompute the successor puzzle while nothing has mutated: the
        // rotation is pure and the point derivation is the only step that
        // is fallible by type.
        let successor = if closes_epoch {
            let mut hasher = blake3::Hasher::new();
            hasher.update(signature.as_bytes());
            hasher.update(&now.to_le_bytes());
            let trigger = RotationTrigger {
                now,
                entropy: *hasher.finalize().as_bytes(),
            };
            let next = state.puzzle.rotated(&trigger, &*self.policy);
            let next_point = public_key_of(&next.secret_scalar_a)?;
            Some((next, next_point))
        } else {
            None
        };

        // Payment is the last fallible step.
        let routed_pool = match self.sink.pool_for(recipient).await {
            Some(pool_id) => {
                self.sink
                    .notify_reward(pool_id, self.treasury, reward, now)
                    .await
                    .map_err(|e| PowError::Sink(e.to_string()))?;
                Some(pool_id)
            }
            None => {
                self.ledger
                    .transfer(self.treasury, recipient, reward)
                    .await
                    .map_err(|e| PowError::Ledger(e.to_string()))?;
                None
            }
        };

        // From here on nothing fails.
        state.spent.insert(marker);
        state.puzzle.submissions_in_epoch += 1;

        info!(
            address = %solution_address,
            recipient = %recipient,
            reward = %reward,
            epoch_nonce = epoch_nonce,
            submissions = state.puzzle.submissions_in_epoch,
            pool = ?routed_pool,
            "⛏️  Submission accepted"
        );

        if let Some((mut next, next_point)) = successor {
            let remaining = self.ledger.balance_of(self.treasury).await;
            next.reward_amount = self.schedule.next_reward(reward, remaining);
            info!(
                epoch_nonce = next.epoch_nonce,
                difficulty = %next.difficulty,
                reward = %next.reward_amount,
                "🔄 Puzzle rotated"
            );
            state.puzzle = next;
            state.point_a = next_point;
        }

        Ok(SubmissionReceipt {
            solution_address,
            reward,
            epoch_nonce,
            routed_pool,
        })
    }

    fn spent_marker(point_b: &PublicPoint, signature: &RecoverableSignature) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&point_b.to_uncompressed());
        hasher.update(signature.as_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Snapshot of the live puzzle. The secret scalar being readable is
    /// intentional: anyone may search for a qualifying solution.
    pub async fn puzzle(&self) -> PuzzleState {
        self.state.read().await.puzzle.clone()
    }

    pub async fn mining_active(&self) -> bool {
        self.state.read().await.mining_active
    }

    /// Public point of the current secret scalar.
    pub async fn public_point_a(&self) -> PublicPoint {
        self.state.read().await.point_a
    }
}
