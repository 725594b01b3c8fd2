//! Pool limits configuration from environment variables.

use crate::domain::invariants::limits;
use crate::domain::Amount;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A lower bound exceeds its upper bound.
    #[error("{name}: min {min} exceeds max {max}")]
    InvertedRange {
        /// Limit name.
        name: &'static str,
        /// Lower bound.
        min: String,
        /// Upper bound.
        max: String,
    },

    /// A limit is outside what the pool can honour.
    #[error("{name} = {value} is invalid: {reason}")]
    InvalidLimit {
        /// Limit name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Why it is rejected.
        reason: &'static str,
    },
}

/// Limits applied when creating and running a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoscaConfig {
    /// Shortest round period in days.
    pub min_round_period_days: u64,
    /// Longest round period in days.
    pub max_round_period_days: u64,
    /// Smallest contribution size.
    pub min_contribution: Amount,
    /// Largest contribution size.
    pub max_contribution: Amount,
    /// Fee ceiling in thousandths.
    pub max_fee_in_thousandths: u32,
    /// Bid floor as a percentage of the pot.
    pub min_distribution_percent: u32,
    /// Minimum delay between creation and the first round.
    pub min_time_before_start_secs: u64,
    /// Minimum members, foreperson included.
    pub min_members: usize,
}

impl Default for RoscaConfig {
    fn default() -> Self {
        Self {
            min_round_period_days: limits::MIN_ROUND_PERIOD_DAYS,
            max_round_period_days: limits::MAX_ROUND_PERIOD_DAYS,
            min_contribution: limits::MIN_CONTRIBUTION,
            max_contribution: limits::MAX_CONTRIBUTION,
            max_fee_in_thousandths: limits::MAX_FEE_IN_THOUSANDTHS,
            min_distribution_percent: limits::MIN_DISTRIBUTION_PERCENT,
            min_time_before_start_secs: limits::MIN_TIME_BEFORE_START_SECS,
            min_members: limits::MIN_MEMBERS,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl RoscaConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ROSCA_MIN_ROUND_PERIOD_DAYS` (default: 1)
    /// - `ROSCA_MAX_ROUND_PERIOD_DAYS` (default: 30)
    /// - `ROSCA_MIN_CONTRIBUTION` (default: 1e15)
    /// - `ROSCA_MAX_CONTRIBUTION` (default: 1e19)
    /// - `ROSCA_MAX_FEE_IN_THOUSANDTHS` (default: 20)
    /// - `ROSCA_MIN_DISTRIBUTION_PERCENT` (default: 65)
    /// - `ROSCA_MIN_TIME_BEFORE_START_SECS` (default: 86400)
    /// - `ROSCA_MIN_MEMBERS` (default: 2)
    ///
    /// Unset or unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            min_round_period_days: env_or("ROSCA_MIN_ROUND_PERIOD_DAYS", d.min_round_period_days),
            max_round_period_days: env_or("ROSCA_MAX_ROUND_PERIOD_DAYS", d.max_round_period_days),
            min_contribution: env_or("ROSCA_MIN_CONTRIBUTION", d.min_contribution),
            max_contribution: env_or("ROSCA_MAX_CONTRIBUTION", d.max_contribution),
            max_fee_in_thousandths: env_or(
                "ROSCA_MAX_FEE_IN_THOUSANDTHS",
                d.max_fee_in_thousandths,
            ),
            min_distribution_percent: env_or(
                "ROSCA_MIN_DISTRIBUTION_PERCENT",
                d.min_distribution_percent,
            ),
            min_time_before_start_secs: env_or(
                "ROSCA_MIN_TIME_BEFORE_START_SECS",
                d.min_time_before_start_secs,
            ),
            min_members: env_or("ROSCA_MIN_MEMBERS", d.min_members),
        }
    }

    /// Check that the limits are coherent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_round_period_days > self.max_round_period_days {
            return Err(ConfigError::InvertedRange {
                name: "round_period_days",
                min: self.min_round_period_days.to_string(),
                max: self.max_round_period_days.to_string(),
            });
        }
        if self.min_contribution > self.max_contribution {
            return Err(ConfigError::InvertedRange {
                name: "contribution",
                min: self.min_contribution.to_string(),
                max: self.max_contribution.to_string(),
            });
        }
        if self.min_round_period_days == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "min_round_period_days",
                value: "0".to_string(),
                reason: "rounds need a non-zero period",
            });
        }
        if self.min_members < 2 {
            return Err(ConfigError::InvalidLimit {
                name: "min_members",
                value: self.min_members.to_string(),
                reason: "a pool needs at least two members",
            });
        }
        if self.min_distribution_percent == 0 || self.min_distribution_percent > 100 {
            return Err(ConfigError::InvalidLimit {
                name: "min_distribution_percent",
                value: self.min_distribution_percent.to_string(),
                reason: "must be within 1..=100",
            });
        }
        if self.max_fee_in_thousandths >= 1000 {
            return Err(ConfigError::InvalidLimit {
                name: "max_fee_in_thousandths",
                value: self.max_fee_in_thousandths.to_string(),
                reason: "fee must stay below the whole pot",
            });
        }
        Ok(())
    }
}
