//! Configuration management with validation and defaults
//!
//! A room's roulette settings: bet limits, payout table, timing and the
//! hot-spin bonus tiers. Loaded from TOML with `ROULETTE_*` environment
//! overrides, or held by a [`crate::store::ConfigStore`] per room.

use crate::errors::{ConfigurationError, RouletteResult};
use crate::games::types::BetCategory;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Shortest betting window an operator may configure
pub const MIN_BETTING_WINDOW_SECS: u64 = 30;
/// Longest betting window an operator may configure
pub const MAX_BETTING_WINDOW_SECS: u64 = 300;

/// Complete roulette configuration for one room
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RouletteConfig {
    pub enabled: bool,
    pub betting: BettingLimits,
    pub payouts: PayoutTable,
    pub timing: TimingConfig,
    pub hot_spin: HotSpinConfig,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            betting: BettingLimits::default(),
            payouts: PayoutTable::default(),
            timing: TimingConfig::default(),
            hot_spin: HotSpinConfig::default(),
        }
    }
}

/// Per-selection stake limits
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BettingLimits {
    pub min_bet: u64,
    pub max_bet: u64,
}

impl Default for BettingLimits {
    fn default() -> Self {
        Self {
            min_bet: 1,
            max_bet: 10_000,
        }
    }
}

/// Multiplier per bet category. A winning wager returns the stake plus
/// `stake * multiplier`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayoutTable {
    pub zero: u64,
    pub number: u64,
    pub color: u64,
    pub dozen: u64,
    pub odd_or_even: u64,
    pub halfs: u64,
    pub column: u64,
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self {
            zero: 35,
            number: 35,
            color: 1,
            dozen: 2,
            odd_or_even: 1,
            halfs: 1,
            column: 2,
        }
    }
}

impl PayoutTable {
    pub fn multiplier(&self, category: BetCategory) -> u64 {
        match category {
            BetCategory::Zero => self.zero,
            BetCategory::Number => self.number,
            BetCategory::Color => self.color,
            BetCategory::Dozen => self.dozen,
            BetCategory::OddOrEven => self.odd_or_even,
            BetCategory::Halfs => self.halfs,
            BetCategory::Column => self.column,
        }
    }

    pub fn set(&mut self, category: BetCategory, multiplier: u64) {
        let slot = match category {
            BetCategory::Zero => &mut self.zero,
            BetCategory::Number => &mut self.number,
            BetCategory::Color => &mut self.color,
            BetCategory::Dozen => &mut self.dozen,
            BetCategory::OddOrEven => &mut self.odd_or_even,
            BetCategory::Halfs => &mut self.halfs,
            BetCategory::Column => &mut self.column,
        };
        *slot = multiplier;
    }
}

/// Round timing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingConfig {
    /// Seconds bets are accepted before the wheel spins
    pub betting_window_secs: u64,
    pub spin_delay_min_secs: u64,
    pub spin_delay_max_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            betting_window_secs: 60,
            spin_delay_min_secs: 3,
            spin_delay_max_secs: 8,
        }
    }
}

impl TimingConfig {
    pub fn betting_window(&self) -> Duration {
        Duration::from_secs(self.betting_window_secs)
    }

    pub fn spin_delay_bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.spin_delay_min_secs),
            Duration::from_secs(self.spin_delay_max_secs),
        )
    }
}

/// One independent bonus roll: `bonus_bps` basis points are added with
/// probability `1 / one_in`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HotSpinTier {
    pub one_in: u32,
    pub bonus_bps: u32,
}

/// Bonus event parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HotSpinConfig {
    pub enabled: bool,
    pub tiers: Vec<HotSpinTier>,
}

impl Default for HotSpinConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tiers: vec![
                HotSpinTier { one_in: 10, bonus_bps: 500 },
                HotSpinTier { one_in: 20, bonus_bps: 1_000 },
                HotSpinTier { one_in: 40, bonus_bps: 2_000 },
                HotSpinTier { one_in: 200, bonus_bps: 10_000 },
            ],
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> RouletteResult<RouletteConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            RouletteConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> RouletteResult<RouletteConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut RouletteConfig) -> RouletteResult<()> {
        if let Some(enabled) = env_parse("ROULETTE_ENABLED", "Invalid boolean value")? {
            config.enabled = enabled;
        }
        if let Some(min_bet) = env_parse("ROULETTE_MIN_BET", "Invalid amount")? {
            config.betting.min_bet = min_bet;
        }
        if let Some(max_bet) = env_parse("ROULETTE_MAX_BET", "Invalid amount")? {
            config.betting.max_bet = max_bet;
        }
        if let Some(window) = env_parse("ROULETTE_BETTING_WINDOW_SECS", "Invalid number of seconds")? {
            config.timing.betting_window_secs = window;
        }
        if let Some(hot) = env_parse("ROULETTE_HOT_SPIN_ENABLED", "Invalid boolean value")? {
            config.hot_spin.enabled = hot;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &RouletteConfig, path: &str) -> RouletteResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, reason: &str) -> RouletteResult<Option<T>> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigurationError::InvalidValue {
                field: key.to_string(),
                value,
                reason: reason.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Check bet limits alone; shared with the operator settings.
pub fn validate_limits(limits: &BettingLimits) -> Result<(), ConfigurationError> {
    if limits.min_bet == 0 {
        return Err(invalid("betting.min_bet", 0, "Minimum bet must be positive"));
    }
    if limits.min_bet > limits.max_bet {
        return Err(invalid(
            "betting.max_bet",
            limits.max_bet,
            "Maximum bet cannot be below the minimum bet",
        ));
    }
    Ok(())
}

/// Check the betting window alone; shared with the operator settings.
pub fn validate_window(secs: u64) -> Result<(), ConfigurationError> {
    if !(MIN_BETTING_WINDOW_SECS..=MAX_BETTING_WINDOW_SECS).contains(&secs) {
        return Err(invalid(
            "timing.betting_window_secs",
            secs,
            "Betting window must be between 30 seconds and 5 minutes",
        ));
    }
    Ok(())
}

/// Validate configuration values
pub fn validate(config: &RouletteConfig) -> Result<(), ConfigurationError> {
    validate_limits(&config.betting)?;
    validate_window(config.timing.betting_window_secs)?;

    if config.timing.spin_delay_min_secs > config.timing.spin_delay_max_secs {
        return Err(invalid(
            "timing.spin_delay_max_secs",
            config.timing.spin_delay_max_secs,
            "Spin delay maximum cannot be below the minimum",
        ));
    }

    for (index, tier) in config.hot_spin.tiers.iter().enumerate() {
        if tier.one_in == 0 {
            return Err(invalid(&format!("hot_spin.tiers[{}].one_in", index), 0, "Odds cannot be zero"));
        }
    }

    Ok(())
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> RouletteResult<()> {
    ConfigLoader::new().save(&RouletteConfig::default(), path)
}
