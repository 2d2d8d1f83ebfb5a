//! Search bounds and cooperative cancellation.
//!
//! The backtracking search is exponential in the worst case, so every run
//! carries a step bound (backtracks) and an optional wall-clock bound.
//! The clock is sampled every [`CLOCK_CHECK_INTERVAL`] iterations to keep
//! `Instant::now` off the hot path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::SchedulerConfig;

/// Search iterations between two wall-clock checks.
pub const CLOCK_CHECK_INTERVAL: u64 = 256;

/// Shared flag used to stop a run from another thread.
///
/// Clones share the same flag. The scheduler polls it once per search step.
///
/// # Example
/// ```
/// use u_timetable::scheduler::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every run observing this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Which bound stopped the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLimit {
    Backtracks,
    Time,
}

/// Step and time accounting for one run.
#[derive(Debug, Clone)]
pub struct SearchBudget {
    max_backtracks: u64,
    time_limit: Option<Duration>,
    started: Instant,
    backtracks: u64,
    iterations: u64,
}

impl SearchBudget {
    /// Starts the clock.
    pub fn new(max_backtracks: u64, time_limit: Option<Duration>) -> Self {
        Self {
            max_backtracks,
            time_limit,
            started: Instant::now(),
            backtracks: 0,
            iterations: 0,
        }
    }

    /// Budget taken from a scheduler configuration.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.max_backtracks, config.time_limit())
    }

    /// Counts one search iteration and reports whether a bound is reached.
    pub fn tick(&mut self) -> Option<BudgetLimit> {
        self.iterations += 1;
        if self.backtracks > self.max_backtracks {
            return Some(BudgetLimit::Backtracks);
        }
        if let Some(limit) = self.time_limit {
            if self.iterations % CLOCK_CHECK_INTERVAL == 0 && self.started.elapsed() >= limit {
                return Some(BudgetLimit::Time);
            }
        }
        None
    }

    /// Counts one backtrack step.
    pub fn record_backtrack(&mut self) {
        self.backtracks += 1;
    }

    pub fn backtracks(&self) -> u64 {
        self.backtracks
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Time since the budget was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_backtrack_limit() {
        let mut budget = SearchBudget::new(2, None);
        assert_eq!(budget.tick(), None);
        budget.record_backtrack();
        budget.record_backtrack();
        assert_eq!(budget.tick(), None);
        budget.record_backtrack();
        assert_eq!(budget.tick(), Some(BudgetLimit::Backtracks));
        assert_eq!(budget.backtracks(), 3);
        assert_eq!(budget.iterations(), 3);
    }

    #[test]
    fn test_time_limit() {
        let mut budget = SearchBudget::new(u64::MAX, Some(Duration::ZERO));
        let hit = (0..CLOCK_CHECK_INTERVAL).filter_map(|_| budget.tick()).next();
        assert_eq!(hit, Some(BudgetLimit::Time));
    }

    #[test]
    fn test_from_config() {
        let config = SchedulerConfig::default().with_max_backtracks(0);
        let mut budget = SearchBudget::from_config(&config);
        assert_eq!(budget.tick(), None);
        budget.record_backtrack();
        assert_eq!(budget.tick(), Some(BudgetLimit::Backtracks));
    }
}
