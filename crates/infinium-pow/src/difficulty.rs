use serde::{Deserialize, Serialize};
use std::fmt;

/// A 160-bit big-endian acceptance threshold. A solution address is valid
/// when its magic-XORed value compares strictly below this. Smaller means
/// harder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Difficulty([u8; 20]);

impl Difficulty {
    /// Every address qualifies (except the all-ones XOR image).
    pub const MAX: Self = Self([0xff; 20]);

    /// The hardest representable threshold: only the zero image qualifies.
    pub const MIN: Self = Self([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
    ]);

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Strict big-endian comparison: `value < self`.
    pub fn admits(&self, value: &[u8; 20]) -> bool {
        value < &self.0
    }

    /// `self * numerator / denominator` over the full 160-bit width,
    /// saturating at [`Difficulty::MAX`] and flooring at
    /// [`Difficulty::MIN`].
    pub fn mul_div(&self, numerator: u64, denominator: u64) -> Self {
        debug_assert!(denominator != 0);

        // Widen to 28 bytes: 160 bits * u64 needs at most 224.
        let mut wide = [0u8; 28];
        let mut carry: u128 = 0;
        for i in 0..20 {
            let v = self.0[19 - i] as u128 * numerator as u128 + carry;
            wide[27 - i] = (v & 0xff) as u8;
            carry = v >> 8;
        }
        let mut i = 20;
        while carry > 0 && i < 28 {
            wide[27 - i] = (carry & 0xff) as u8;
            carry >>= 8;
            i += 1;
        }

        // Big-endian long division by the denominator.
        let mut quotient = [0u8; 28];
        let mut rem: u128 = 0;
        for i in 0..28 {
            let acc = (rem << 8) | wide[i] as u128;
            quotient[i] = (acc / denominator as u128) as u8;
            rem = acc % denominator as u128;
        }

        if quotient[..8].iter().any(|&b| b != 0) {
            return Self::MAX;
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&quotient[8..]);
        if out == [0u8; 20] {
            return Self::MIN;
        }
        Self(out)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Difficulty adjustment applied at epoch rotation. Pluggable: the exact
/// production rule is a protocol parameter and can be swapped without
/// touching the engine.
pub trait DifficultyPolicy: Send + Sync {
    /// Computes the next epoch's threshold from the current one and the
    /// observed duration of the epoch that just closed.
    fn next_difficulty(&self, current: &Difficulty, observed_epoch_secs: i64) -> Difficulty;
}

/// Retargets the threshold proportionally to how fast the closing epoch
/// filled relative to the target duration, clamped so one rotation can move
/// difficulty by at most `max_adjust_factor` in either direction. A fast
/// epoch shrinks the threshold (harder), a slow one grows it.
#[derive(Debug, Clone)]
pub struct EpochRetarget {
    pub target_epoch_secs: u64,
    pub max_adjust_factor: u64,
}

impl Default for EpochRetarget {
    fn default() -> Self {
        Self {
            target_epoch_secs: 3600,
            max_adjust_factor: 4,
        }
    }
}

impl DifficultyPolicy for EpochRetarget {
    fn next_difficulty(&self, current: &Difficulty, observed_epoch_secs: i64) -> Difficulty {
        let target = self.target_epoch_secs.max(1);
        let floor = target / self.max_adjust_factor.max(1);
        let ceil = target.saturating_mul(self.max_adjust_factor.max(1));
        let observed = (observed_epoch_secs.max(0) as u64).clamp(floor.max(1), ceil);
        current.mul_div(observed, target)
    }
}

/// Keeps the threshold unchanged across rotations. Test and bootstrap use.
#[derive(Debug, Clone, Default)]
pub struct FixedDifficulty;

impl DifficultyPolicy for FixedDifficulty {
    fn next_difficulty(&self, current: &Difficulty, _observed_epoch_secs: i64) -> Difficulty {
        *current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_strict_comparison() {
        let d = Difficulty::from_bytes([0x10; 20]);
        let mut below = [0x10; 20];
        below[19] = 0x0f;
        assert!(d.admits(&below));
        assert!(!d.admits(&[0x10; 20])); // equal is rejected
        assert!(!d.admits(&[0x11; 20]));
    }

    #[test]
    fn test_mul_div_identity_and_halving() {
        let d = Difficulty::from_bytes([0x80; 20]);
        assert_eq!(d.mul_div(1, 1), d);

        let half = d.mul_div(1, 2);
        assert_eq!(half.as_bytes()[0], 0x40);
        assert!(half < d);
    }

    #[test]
    fn test_mul_div_saturates() {
        assert_eq!(Difficulty::MAX.mul_div(3, 1), Difficulty::MAX);
        assert_eq!(Difficulty::MIN.mul_div(1, u64::MAX), Difficulty::MIN);
    }

    #[test]
    fn test_mul_div_cross_byte() {
        // 0x0100 / 2 = 0x0080 across a byte boundary
        let mut bytes = [0u8; 20];
        bytes[18] = 0x01;
        let d = Difficulty::from_bytes(bytes);
        let mut expected = [0u8; 20];
        expected[19] = 0x80;
        assert_eq!(d.mul_div(1, 2), Difficulty::from_bytes(expected));
    }

    #[test]
    fn test_retarget_direction() {
        let policy = EpochRetarget {
            target_epoch_secs: 1000,
            max_adjust_factor: 4,
        };
        let d = Difficulty::from_bytes([0x80; 20]);

        // Epoch closed twice as fast: threshold halves.
        let faster = policy.next_difficulty(&d, 500);
        assert_eq!(faster, d.mul_div(1, 2));

        // Epoch took twice as long: threshold doubles.
        let slower = policy.next_difficulty(&d, 2000);
        assert_eq!(slower, d.mul_div(2, 1));

        // On target: unchanged.
        assert_eq!(policy.next_difficulty(&d, 1000), d);
    }

    #[test]
    fn test_retarget_clamps() {
        let policy = EpochRetarget {
            target_epoch_secs: 1000,
            max_adjust_factor: 4,
        };
        let d = Difficulty::from_bytes([0x80; 20]);

        // Instant epoch clamps at 1/4, not beyond.
        assert_eq!(policy.next_difficulty(&d, 0), d.mul_div(1, 4));
        // Stalled epoch clamps at 4x.
        assert_eq!(policy.next_difficulty(&d, 1_000_000), d.mul_div(4, 1));
    }
}
