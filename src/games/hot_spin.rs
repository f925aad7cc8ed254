use crate::config::HotSpinConfig;
use crate::games::wheel::WheelRng;
use serde::{Deserialize, Serialize};

/// Basis points in one whole payout
pub const BPS_SCALE: u32 = 10_000;

/// Per-round bonus applied to every winning payout, in basis points.
/// `2_500` means +25%.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotSpinBonus(u32);

impl HotSpinBonus {
    pub const NONE: HotSpinBonus = HotSpinBonus(0);

    pub fn from_bps(bps: u32) -> Self {
        Self(bps)
    }

    /// Roll every tier independently and sum the ones that hit
    pub fn sample(config: &HotSpinConfig, wheel: &dyn WheelRng) -> Self {
        if !config.enabled {
            return Self::NONE;
        }
        let total = config
            .tiers
            .iter()
            .filter(|tier| wheel.chance(tier.one_in))
            .fold(0u32, |sum, tier| sum.saturating_add(tier.bonus_bps));
        Self(total)
    }

    pub fn bps(&self) -> u32 {
        self.0
    }

    pub fn is_hot(&self) -> bool {
        self.0 > 0
    }

    /// Scale a payout by `1 + bonus`, flooring to whole credits
    pub fn apply(&self, payout: u64) -> u64 {
        if !self.is_hot() {
            return payout;
        }
        let scaled = u128::from(payout) * (u128::from(BPS_SCALE) + u128::from(self.0)) / u128::from(BPS_SCALE);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

impl std::fmt::Display for HotSpinBonus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (whole, fraction) = (self.0 / 100, self.0 % 100);
        if fraction == 0 {
            write!(f, "+{}%", whole)
        } else {
            write!(f, "+{}.{:02}%", whole, fraction)
        }
    }
}
