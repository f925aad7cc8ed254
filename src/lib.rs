//! Roulette Engine - multiplayer roulette rounds for chat rooms
//!
//! Players in a room stake credits on numbers and outside bets while a timed
//! betting window is open; the wheel then spins, winners are paid from the
//! configured payout table (optionally boosted by a hot spin) and everyone's
//! net result is folded into a persistent leaderboard. Balances, settings and
//! user statistics live behind the traits in [`store`].

pub mod config;
pub mod errors;
pub mod games;
pub mod store;

pub use config::{ConfigLoader, RouletteConfig};
pub use errors::{RouletteError, RouletteResult};
pub use games::{EngineServices, RoundOutcome, RoundScheduler};
