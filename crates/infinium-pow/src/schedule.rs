use crate::puzzle::EPOCH_LENGTH;
use infinium_token::Amount;

/// Recomputes the per-submission reward at each epoch rotation from the
/// engine treasury's remaining funding. Pluggable for the same reason the
/// difficulty policy is.
pub trait RewardSchedule: Send + Sync {
    fn next_reward(&self, current: Amount, treasury_remaining: Amount) -> Amount;
}

/// Pays out a fixed basis-point fraction of the remaining treasury per
/// epoch, split evenly across the epoch's submissions. The per-submission
/// reward therefore decays geometrically as the funding depletes and never
/// overspends what is left.
#[derive(Debug, Clone)]
pub struct SupplyDecaySchedule {
    pub emission_bps_per_epoch: u32,
    pub epoch_length: u32,
}

impl Default for SupplyDecaySchedule {
    fn default() -> Self {
        Self {
            emission_bps_per_epoch: 100, // 1% of remaining funding per epoch
            epoch_length: EPOCH_LENGTH,
        }
    }
}

impl RewardSchedule for SupplyDecaySchedule {
    fn next_reward(&self, _current: Amount, treasury_remaining: Amount) -> Amount {
        let per_epoch = treasury_remaining.mul_div(self.emission_bps_per_epoch, 10_000);
        Amount::from_base_units(per_epoch.to_base_units() / self.epoch_length.max(1) as u128)
    }
}

/// Keeps the reward unchanged across rotations.
#[derive(Debug, Clone, Default)]
pub struct FixedReward;

impl RewardSchedule for FixedReward {
    fn next_reward(&self, current: Amount, _treasury_remaining: Amount) -> Amount {
        current
    }
}
