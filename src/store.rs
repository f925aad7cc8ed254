//! External collaborators of the engine
//!
//! The engine never owns balances, settings or user statistics. It talks to
//! them through these traits; the in-memory implementations back the
//! simulator and the tests.

use crate::config::RouletteConfig;
use crate::errors::{LedgerError, RouletteResult};
use crate::games::types::{LeaderboardEntry, RoomId, UserId};
use async_trait::async_trait;
use dashmap::DashMap;

/// Result of crediting a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
    /// The full amount was credited
    Credited(u64),
    /// The balance hit its ceiling; only `credited` was paid
    Clipped { credited: u64, max_balance: u64 },
}

impl CreditOutcome {
    pub fn credited(&self) -> u64 {
        match self {
            CreditOutcome::Credited(amount) => *amount,
            CreditOutcome::Clipped { credited, .. } => *credited,
        }
    }

    pub fn is_clipped(&self) -> bool {
        matches!(self, CreditOutcome::Clipped { .. })
    }
}

/// Credit/balance ledger
#[async_trait]
pub trait BalanceLedger: Send + Sync {
    /// Remove `amount` from the user's balance, failing without effect when
    /// the balance cannot cover it
    async fn debit(&self, user: UserId, amount: u64) -> Result<u64, LedgerError>;

    /// Add `amount`, clipping at the ledger's maximum balance
    async fn credit(&self, user: UserId, amount: u64) -> Result<CreditOutcome, LedgerError>;

    async fn balance(&self, user: UserId) -> Result<u64, LedgerError>;
}

/// Per-room settings store
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self, room: RoomId) -> RouletteResult<RouletteConfig>;

    async fn save(&self, room: RoomId, config: &RouletteConfig) -> RouletteResult<()>;
}

/// Persistent per-user leaderboard records
#[async_trait]
pub trait UserStatsStore: Send + Sync {
    async fn load_entry(&self, user: UserId) -> RouletteResult<LeaderboardEntry>;

    async fn save_entry(&self, user: UserId, entry: LeaderboardEntry) -> RouletteResult<()>;

    /// Every user with a stored record
    async fn all_entries(&self) -> RouletteResult<Vec<(UserId, LeaderboardEntry)>>;
}

/// In-memory bank with a single balance ceiling for every account
pub struct InMemoryBank {
    balances: DashMap<UserId, u64>,
    max_balance: u64,
}

impl InMemoryBank {
    pub fn new(max_balance: u64) -> Self {
        Self {
            balances: DashMap::new(),
            max_balance,
        }
    }

    /// Set a balance directly, clipped to the ceiling
    pub fn set_balance(&self, user: UserId, amount: u64) {
        self.balances.insert(user, amount.min(self.max_balance));
    }

    pub fn max_balance(&self) -> u64 {
        self.max_balance
    }
}

impl Default for InMemoryBank {
    fn default() -> Self {
        Self::new(u64::MAX)
    }
}

#[async_trait]
impl BalanceLedger for InMemoryBank {
    async fn debit(&self, user: UserId, amount: u64) -> Result<u64, LedgerError> {
        let mut balance = self.balances.entry(user).or_insert(0);
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                user,
                requested: amount,
            });
        }
        *balance -= amount;
        Ok(*balance)
    }

    async fn credit(&self, user: UserId, amount: u64) -> Result<CreditOutcome, LedgerError> {
        let mut balance = self.balances.entry(user).or_insert(0);
        let headroom = self.max_balance.saturating_sub(*balance);
        if amount > headroom {
            *balance = self.max_balance;
            return Ok(CreditOutcome::Clipped {
                credited: headroom,
                max_balance: self.max_balance,
            });
        }
        *balance += amount;
        Ok(CreditOutcome::Credited(amount))
    }

    async fn balance(&self, user: UserId) -> Result<u64, LedgerError> {
        Ok(self.balances.get(&user).map(|b| *b).unwrap_or(0))
    }
}

/// In-memory settings; rooms without an entry use the fallback config
pub struct InMemoryConfigStore {
    rooms: DashMap<RoomId, RouletteConfig>,
    fallback: RouletteConfig,
}

impl InMemoryConfigStore {
    pub fn new(fallback: RouletteConfig) -> Self {
        Self {
            rooms: DashMap::new(),
            fallback,
        }
    }
}

impl Default for InMemoryConfigStore {
    fn default() -> Self {
        Self::new(RouletteConfig::default())
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn load(&self, room: RoomId) -> RouletteResult<RouletteConfig> {
        Ok(self
            .rooms
            .get(&room)
            .map(|config| config.clone())
            .unwrap_or_else(|| self.fallback.clone()))
    }

    async fn save(&self, room: RoomId, config: &RouletteConfig) -> RouletteResult<()> {
        self.rooms.insert(room, config.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryStatsStore {
    entries: DashMap<UserId, LeaderboardEntry>,
}

impl InMemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStatsStore for InMemoryStatsStore {
    async fn load_entry(&self, user: UserId) -> RouletteResult<LeaderboardEntry> {
        Ok(self.entries.get(&user).map(|e| *e).unwrap_or_default())
    }

    async fn save_entry(&self, user: UserId, entry: LeaderboardEntry) -> RouletteResult<()> {
        self.entries.insert(user, entry);
        Ok(())
    }

    async fn all_entries(&self) -> RouletteResult<Vec<(UserId, LeaderboardEntry)>> {
        Ok(self.entries.iter().map(|e| (*e.key(), *e.value())).collect())
    }
}
