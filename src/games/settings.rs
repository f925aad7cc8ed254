//! Operator-facing roulette settings for a room.

use crate::config::{validate_limits, validate_window, BettingLimits};
use crate::errors::{ConfigurationError, RouletteResult};
use crate::games::types::{BetCategory, RoomId};
use crate::store::ConfigStore;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Snapshot rendered by the settings command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSummary {
    pub enabled: bool,
    pub betting_window: Duration,
    pub min_bet: u64,
    pub max_bet: u64,
    /// Highest multiplier first
    pub payouts: Vec<(BetCategory, u64)>,
}

impl fmt::Display for SettingsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", if self.enabled { "Enabled" } else { "Disabled" })?;
        writeln!(f, "Time to Spin: {} seconds", self.betting_window.as_secs())?;
        writeln!(f, "Bet Limits: {} - {}", self.min_bet, self.max_bet)?;
        writeln!(f, "Payout Settings:")?;
        for (category, multiplier) in &self.payouts {
            writeln!(f, "  {}: {}", title_case(category.as_str()), multiplier)?;
        }
        Ok(())
    }
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub struct RouletteSettings {
    store: Arc<dyn ConfigStore>,
}

impl RouletteSettings {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Set how long bets are taken before the wheel spins (30s to 5min)
    pub async fn set_betting_window(&self, room: RoomId, secs: u64) -> RouletteResult<()> {
        validate_window(secs)?;
        let mut config = self.store.load(room).await?;
        config.timing.betting_window_secs = secs;
        self.store.save(room, &config).await?;
        info!(room, secs, "Betting window updated");
        Ok(())
    }

    /// Flip roulette on or off; returns the new state
    pub async fn toggle(&self, room: RoomId) -> RouletteResult<bool> {
        let mut config = self.store.load(room).await?;
        config.enabled = !config.enabled;
        self.store.save(room, &config).await?;
        info!(room, enabled = config.enabled, "Roulette toggled");
        Ok(config.enabled)
    }

    /// Set the multiplier for a payout type by name
    pub async fn set_payout(&self, room: RoomId, category: &str, multiplier: u64) -> RouletteResult<()> {
        let category: BetCategory = category.parse().map_err(|reason| ConfigurationError::InvalidValue {
            field: "payouts".to_string(),
            value: category.to_string(),
            reason,
        })?;
        let mut config = self.store.load(room).await?;
        config.payouts.set(category, multiplier);
        self.store.save(room, &config).await?;
        info!(room, %category, multiplier, "Payout updated");
        Ok(())
    }

    pub async fn set_bet_limits(&self, room: RoomId, min_bet: u64, max_bet: u64) -> RouletteResult<()> {
        let limits = BettingLimits { min_bet, max_bet };
        validate_limits(&limits)?;
        let mut config = self.store.load(room).await?;
        config.betting = limits;
        self.store.save(room, &config).await?;
        info!(room, min_bet, max_bet, "Bet limits updated");
        Ok(())
    }

    pub async fn summary(&self, room: RoomId) -> RouletteResult<SettingsSummary> {
        let config = self.store.load(room).await?;
        let mut payouts: Vec<(BetCategory, u64)> = BetCategory::ALL
            .iter()
            .map(|category| (*category, config.payouts.multiplier(*category)))
            .collect();
        payouts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(SettingsSummary {
            enabled: config.enabled,
            betting_window: config.timing.betting_window(),
            min_bet: config.betting.min_bet,
            max_bet: config.betting.max_bet,
            payouts,
        })
    }
}
