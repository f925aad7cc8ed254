use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chat user identifier
pub type UserId = u64;

/// Room (guild/channel) identifier; one round may run per room
pub type RoomId = u64;

/// Pocket colour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
    Green,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Black => write!(f, "black"),
            Color::Green => write!(f, "green"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Odd,
    Even,
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Odd => write!(f, "odd"),
            Parity::Even => write!(f, "even"),
        }
    }
}

/// Ordinal used by halves, dozens and columns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Third {
    First,
    Second,
    Third,
}

impl Third {
    fn ordinal(&self) -> &'static str {
        match self {
            Third::First => "1st",
            Third::Second => "2nd",
            Third::Third => "3rd",
        }
    }
}

/// A normalized wager target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BetSelection {
    /// Single pocket, 0..=36
    Number(u8),
    /// Red or black; green is never a valid selection
    Color(Color),
    Parity(Parity),
    /// First or second half; `Third::Third` is never a valid selection
    Half(Third),
    Dozen(Third),
    Column(Third),
}

impl BetSelection {
    pub const MAX_NUMBER: u8 = 36;

    /// Fixed symbolic tokens, matched case-insensitively
    pub const SYMBOLIC: [(&'static str, BetSelection); 12] = [
        ("red", BetSelection::Color(Color::Red)),
        ("black", BetSelection::Color(Color::Black)),
        ("1st dozen", BetSelection::Dozen(Third::First)),
        ("2nd dozen", BetSelection::Dozen(Third::Second)),
        ("3rd dozen", BetSelection::Dozen(Third::Third)),
        ("odd", BetSelection::Parity(Parity::Odd)),
        ("even", BetSelection::Parity(Parity::Even)),
        ("1st half", BetSelection::Half(Third::First)),
        ("2nd half", BetSelection::Half(Third::Second)),
        ("1st column", BetSelection::Column(Third::First)),
        ("2nd column", BetSelection::Column(Third::Second)),
        ("3rd column", BetSelection::Column(Third::Third)),
    ];

    /// Look up a symbolic token
    pub fn symbolic(token: &str) -> Option<Self> {
        let token = token.trim().to_lowercase();
        Self::SYMBOLIC
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, selection)| *selection)
    }

    /// Single-number selection, `None` outside 0..=36
    pub fn number(n: i64) -> Option<Self> {
        u8::try_from(n)
            .ok()
            .filter(|n| *n <= Self::MAX_NUMBER)
            .map(BetSelection::Number)
    }

    /// Bucket the wager is filed under. A literal zero is its own family.
    pub fn category(&self) -> BetCategory {
        match self {
            BetSelection::Number(0) => BetCategory::Zero,
            BetSelection::Number(_) => BetCategory::Number,
            BetSelection::Color(_) => BetCategory::Color,
            BetSelection::Parity(_) => BetCategory::OddOrEven,
            BetSelection::Half(_) => BetCategory::Halfs,
            BetSelection::Dozen(_) => BetCategory::Dozen,
            BetSelection::Column(_) => BetCategory::Column,
        }
    }
}

impl fmt::Display for BetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetSelection::Number(n) => write!(f, "{}", n),
            BetSelection::Color(color) => write!(f, "{}", color),
            BetSelection::Parity(parity) => write!(f, "{}", parity),
            BetSelection::Half(third) => write!(f, "{} half", third.ordinal()),
            BetSelection::Dozen(third) => write!(f, "{} dozen", third.ordinal()),
            BetSelection::Column(third) => write!(f, "{} column", third.ordinal()),
        }
    }
}

/// The seven mutually exclusive wager families
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BetCategory {
    Zero,
    Number,
    Color,
    Dozen,
    OddOrEven,
    Halfs,
    Column,
}

impl BetCategory {
    pub const ALL: [BetCategory; 7] = [
        BetCategory::Zero,
        BetCategory::Number,
        BetCategory::Color,
        BetCategory::Dozen,
        BetCategory::OddOrEven,
        BetCategory::Halfs,
        BetCategory::Column,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BetCategory::Zero => "zero",
            BetCategory::Number => "number",
            BetCategory::Color => "color",
            BetCategory::Dozen => "dozen",
            BetCategory::OddOrEven => "odd_or_even",
            BetCategory::Halfs => "halfs",
            BetCategory::Column => "column",
        }
    }
}

impl fmt::Display for BetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                format!(
                    "'{}' is not a valid payout type. The available types are `{}`",
                    s,
                    names.join(", ")
                )
            })
    }
}

/// One accepted wager in the open round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wager {
    pub bettor: UserId,
    pub selection: BetSelection,
    pub amount: u64,
}

/// Persisted per-user leaderboard record
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub games: u64,
    pub total: i64,
}
