use serde::{Deserialize, Serialize};
use std::fmt;

pub const INF_DECIMALS: u32 = 18;
pub const INF_BASE_UNIT: u128 = 1_000_000_000_000_000_000; // 10^18

/// A token amount in base units (10^-18 INF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);
    pub const MAX_SUPPLY: Self = Self(1_000_000_000 * INF_BASE_UNIT); // 10^9 INF

    pub fn from_inf(whole: u64) -> Self {
        Self(whole as u128 * INF_BASE_UNIT)
    }

    pub fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    pub fn to_base_units(&self) -> u128 {
        self.0
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0).min(Self::MAX_SUPPLY.0))
    }

    pub fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// value * numerator / denominator, used for basis-point fee splits.
    /// The numerator is bounded well below 2^32 so the product cannot
    /// overflow for any amount within the supply cap.
    pub fn mul_div(&self, numerator: u32, denominator: u32) -> Self {
        debug_assert!(denominator != 0);
        Self(self.0 / denominator as u128 * numerator as u128
            + self.0 % denominator as u128 * numerator as u128 / denominator as u128)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / INF_BASE_UNIT;
        let frac = self.0 % INF_BASE_UNIT;
        if frac == 0 {
            write!(f, "{} INF", whole)
        } else {
            write!(f, "{}.{:018} INF", whole, frac)
        }
    }
}
