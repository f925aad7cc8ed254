//! The wheel: pocket layout and the randomness seam used to spin it.

use crate::games::types::{BetCategory, BetSelection, Color, Parity, Third};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

/// Red pockets on a single-zero wheel.
const RED_NUMBERS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

/// Column groups, interleaved by residue mod 3.
pub const COLUMNS: [[u8; 12]; 3] = [
    [1, 4, 7, 10, 13, 16, 19, 22, 25, 28, 31, 34],
    [2, 5, 8, 11, 14, 17, 20, 23, 26, 29, 32, 35],
    [3, 6, 9, 12, 15, 18, 21, 24, 27, 30, 33, 36],
];

/// A drawn number in 0..=36
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Pocket(u8);

impl Pocket {
    pub fn new(number: u8) -> Option<Self> {
        (number <= BetSelection::MAX_NUMBER).then_some(Self(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn color(&self) -> Color {
        if self.0 == 0 {
            Color::Green
        } else if RED_NUMBERS.contains(&self.0) {
            Color::Red
        } else {
            Color::Black
        }
    }

    pub fn parity(&self) -> Option<Parity> {
        match self.0 {
            0 => None,
            n if n % 2 == 1 => Some(Parity::Odd),
            _ => Some(Parity::Even),
        }
    }

    pub fn half(&self) -> Option<Third> {
        match self.0 {
            0 => None,
            1..=18 => Some(Third::First),
            _ => Some(Third::Second),
        }
    }

    pub fn dozen(&self) -> Option<Third> {
        match self.0 {
            0 => None,
            1..=12 => Some(Third::First),
            13..=24 => Some(Third::Second),
            _ => Some(Third::Third),
        }
    }

    pub fn column(&self) -> Option<Third> {
        if COLUMNS[0].contains(&self.0) {
            Some(Third::First)
        } else if COLUMNS[1].contains(&self.0) {
            Some(Third::Second)
        } else if COLUMNS[2].contains(&self.0) {
            Some(Third::Third)
        } else {
            None
        }
    }

    /// Winning selection for a category, `None` when nothing in that family wins.
    pub fn winning_selection(&self, category: BetCategory) -> Option<BetSelection> {
        match category {
            BetCategory::Zero | BetCategory::Number => Some(BetSelection::Number(self.0)),
            BetCategory::Color => match self.color() {
                Color::Green => None,
                color => Some(BetSelection::Color(color)),
            },
            BetCategory::OddOrEven => self.parity().map(BetSelection::Parity),
            BetCategory::Halfs => self.half().map(BetSelection::Half),
            BetCategory::Dozen => self.dozen().map(BetSelection::Dozen),
            BetCategory::Column => self.column().map(BetSelection::Column),
        }
    }
}

impl std::fmt::Display for Pocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.color(), self.0)
    }
}

/// Source of randomness for a spin
pub trait WheelRng: Send + Sync {
    /// Draw a pocket uniformly from 0..=36
    fn draw(&self) -> Pocket;

    /// True with probability `1 / one_in`
    fn chance(&self, one_in: u32) -> bool;

    /// Delay between the spin starting and the ball landing
    fn spin_delay(&self, min: Duration, max: Duration) -> Duration;
}

/// Default wheel backed by the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngWheel;

impl WheelRng for ThreadRngWheel {
    fn draw(&self) -> Pocket {
        Pocket(rand::thread_rng().gen_range(0..=BetSelection::MAX_NUMBER))
    }

    fn chance(&self, one_in: u32) -> bool {
        one_in > 0 && rand::thread_rng().gen_ratio(1, one_in)
    }

    fn spin_delay(&self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Reproducible wheel for simulations
pub struct SeededWheel {
    rng: Mutex<StdRng>,
}

impl SeededWheel {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}

impl WheelRng for SeededWheel {
    fn draw(&self) -> Pocket {
        self.with_rng(|rng| Pocket(rng.gen_range(0..=BetSelection::MAX_NUMBER)))
    }

    fn chance(&self, one_in: u32) -> bool {
        one_in > 0 && self.with_rng(|rng| rng.gen_ratio(1, one_in))
    }

    fn spin_delay(&self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        self.with_rng(|rng| rng.gen_range(min..=max))
    }
}

/// Always lands on the same pocket, never hot, no spin delay. Used to replay
/// a known result.
#[derive(Debug, Clone, Copy)]
pub struct FixedWheel(pub Pocket);

impl WheelRng for FixedWheel {
    fn draw(&self) -> Pocket {
        self.0
    }

    fn chance(&self, _one_in: u32) -> bool {
        false
    }

    fn spin_delay(&self, min: Duration, _max: Duration) -> Duration {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pocket(n: u8) -> Pocket {
        Pocket::new(n).unwrap()
    }

    #[test]
    fn test_pocket_bounds() {
        assert!(Pocket::new(36).is_some());
        assert!(Pocket::new(37).is_none());
    }

    #[test]
    fn test_colors() {
        assert_eq!(pocket(0).color(), Color::Green);
        assert_eq!(pocket(12).color(), Color::Red);
        assert_eq!(pocket(11).color(), Color::Black);
        let reds = (1..=36).filter(|n| pocket(*n).color() == Color::Red).count();
        assert_eq!(reds, 18);
    }

    #[test]
    fn test_zero_wins_nothing_outside_numbers() {
        let zero = pocket(0);
        for category in [
            BetCategory::Color,
            BetCategory::OddOrEven,
            BetCategory::Halfs,
            BetCategory::Dozen,
            BetCategory::Column,
        ] {
            assert_eq!(zero.winning_selection(category), None, "{}", category);
        }
        assert_eq!(
            zero.winning_selection(BetCategory::Zero),
            Some(BetSelection::Number(0))
        );
    }

    #[test]
    fn test_bands() {
        assert_eq!(pocket(18).half(), Some(Third::First));
        assert_eq!(pocket(19).half(), Some(Third::Second));
        assert_eq!(pocket(12).dozen(), Some(Third::First));
        assert_eq!(pocket(24).dozen(), Some(Third::Second));
        assert_eq!(pocket(25).dozen(), Some(Third::Third));
        assert_eq!(pocket(34).column(), Some(Third::First));
        assert_eq!(pocket(35).column(), Some(Third::Second));
        assert_eq!(pocket(36).column(), Some(Third::Third));
    }

    #[test]
    fn test_column_groups_follow_residue() {
        for (index, column) in COLUMNS.iter().enumerate() {
            assert!(column.iter().all(|n| (*n as usize - 1) % 3 == index));
        }
    }

    #[test]
    fn test_seeded_wheel_is_reproducible() {
        let a = SeededWheel::new(42);
        let b = SeededWheel::new(42);
        let draws_a: Vec<u8> = (0..20).map(|_| a.draw().number()).collect();
        let draws_b: Vec<u8> = (0..20).map(|_| b.draw().number()).collect();
        assert_eq!(draws_a, draws_b);
        assert!(draws_a.iter().all(|n| *n <= 36));
    }

    #[test]
    fn test_spin_delay_within_bounds() {
        let wheel = ThreadRngWheel;
        let min = Duration::from_secs(3);
        let max = Duration::from_secs(8);
        for _ in 0..50 {
            let delay = wheel.spin_delay(min, max);
            assert!(delay >= min && delay <= max);
        }
    }
}
