//! Error types for the roulette engine
//!
//! Every failure in the engine is recoverable: rejections are reported inline
//! to the bettor, collaborator failures are logged and surfaced to the caller.

use crate::games::types::{BetSelection, RoomId, UserId};
use thiserror::Error;

/// Root error type for all engine operations
#[derive(Debug, Error)]
pub enum RouletteError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A single bet was refused
    #[error("Bet rejected: {0}")]
    Bet(#[from] BetRejection),

    /// Round lifecycle errors
    #[error("Round error: {0}")]
    Round(#[from] RoundError),

    /// Balance ledger errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Reasons a single wager is refused. Rendered inline to the bettor; none of
/// them move funds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BetRejection {
    #[error("'{0}' is not a valid option")]
    InvalidSelection(String),

    #[error("your bet ({0}) must be between 0 and 36")]
    OutOfRange(String),

    #[error("you cannot make a duplicate bet on ({0})")]
    Duplicate(BetSelection),

    #[error("you do not have enough funds to complete this bet ({0})")]
    InsufficientFunds(BetSelection),

    #[error("your bet ({0}) could not be processed right now")]
    LedgerUnavailable(BetSelection),

    #[error("your bet must be a positive amount")]
    NonPositiveStake,

    #[error("your bet of {amount} must be at least {min}")]
    BelowMinimum { amount: u64, min: u64 },

    #[error("your bet of {amount} must be at most {max}")]
    AboveMaximum { amount: u64, max: u64 },

    #[error("the wheel is already spinning")]
    WheelSpinning,

    #[error("roulette is disabled here")]
    Disabled,
}

/// Round lifecycle errors
#[derive(Debug, Error)]
pub enum RoundError {
    #[error("There is already a roulette game on in room {room}")]
    AlreadyActive { room: RoomId },

    #[error("No roulette game is running in room {room}")]
    NoActiveRound { room: RoomId },

    #[error("Roulette is disabled in room {room}")]
    Disabled { room: RoomId },
}

/// Errors raised by the external balance ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient funds: user {user} cannot cover {requested}")]
    InsufficientFunds { user: UserId, requested: u64 },

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

// Convenience type alias for Results
pub type RouletteResult<T> = Result<T, RouletteError>;
