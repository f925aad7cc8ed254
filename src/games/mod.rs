pub mod types;
pub mod wheel;
pub mod parser;
pub mod round;
pub mod ledger;
pub mod hot_spin;
pub mod payout;
pub mod leaderboard;
pub mod scheduler;
pub mod settings;

pub use types::*;
pub use wheel::{FixedWheel, Pocket, SeededWheel, ThreadRngWheel, WheelRng};
pub use parser::{parse_bets, BetCandidate, ParsedBets};
pub use round::{RoundPhase, RoundState};
pub use ledger::BetLedger;
pub use hot_spin::HotSpinBonus;
pub use payout::{PayoutEngine, PayoutLine, Settlement, UnpaidCredit};
pub use leaderboard::LeaderboardAccumulator;
pub use scheduler::{BetReceipt, EngineServices, RoundOutcome, RoundScheduler, RoundTicket};
pub use settings::{RouletteSettings, SettingsSummary};
