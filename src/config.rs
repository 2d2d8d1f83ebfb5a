//! Scheduler configuration.
//!
//! Every field has a default, so a partial JSON object (or `{}`)
//! deserializes into a usable configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ranking::RankWeights;

/// Default backtrack budget.
pub const DEFAULT_MAX_BACKTRACKS: u64 = 200_000;

/// Default cap on occurrences of one subject per class per day.
pub const DEFAULT_MAX_DAILY_OCCURRENCES: u32 = 2;

/// Tuning knobs of a scheduling run.
///
/// # Example
/// ```
/// use u_timetable::config::SchedulerConfig;
///
/// let config = SchedulerConfig::default()
///     .with_max_backtracks(10_000)
///     .with_time_limit_ms(500);
/// assert_eq!(config.max_daily_occurrences, Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Backtrack steps allowed before giving up.
    pub max_backtracks: u64,
    /// Wall-clock limit in milliseconds (`None` = unlimited).
    pub time_limit_ms: Option<u64>,
    /// Occurrences of one requirement allowed per day (`None` = unlimited).
    pub max_daily_occurrences: Option<u32>,
    /// Soft-rule weights used to order candidates.
    pub weights: RankWeights,
    /// Re-check every accepted timetable against all hard constraints.
    pub verify_result: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_backtracks: DEFAULT_MAX_BACKTRACKS,
            time_limit_ms: None,
            max_daily_occurrences: Some(DEFAULT_MAX_DAILY_OCCURRENCES),
            weights: RankWeights::default(),
            verify_result: true,
        }
    }
}

impl SchedulerConfig {
    /// Sets the backtrack budget.
    pub fn with_max_backtracks(mut self, max_backtracks: u64) -> Self {
        self.max_backtracks = max_backtracks;
        self
    }

    /// Sets a wall-clock limit.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets or clears the daily occurrence cap.
    pub fn with_max_daily_occurrences(mut self, limit: Option<u32>) -> Self {
        self.max_daily_occurrences = limit;
        self
    }

    /// Sets soft-rule weights.
    pub fn with_weights(mut self, weights: RankWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Enables or disables result verification.
    pub fn with_verify_result(mut self, verify: bool) -> Self {
        self.verify_result = verify;
        self
    }

    /// Time limit as a [`Duration`].
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}
