//! Soft-constraint ranking of candidate placements.
//!
//! Once the constraint engine has filtered a requirement's candidates down
//! to the legal ones, the ranker orders them so the search tries the most
//! desirable placement first. Each soft constraint is a [`SoftRule`]; the
//! [`RankEngine`] combines rule scores as a weighted sum.
//!
//! # Usage
//!
//! ```
//! use u_timetable::ranking::{rules, RankEngine};
//!
//! let engine = RankEngine::new()
//!     .with_rule(rules::FacultyPreference, 10.0)
//!     .with_rule(rules::LoadBalance, 1.0);
//! assert_eq!(engine.rule_count(), 2);
//! ```

mod context;
mod engine;
pub mod rules;

pub use context::RankContext;
pub use engine::{RankEngine, RankWeights};

use crate::availability::Placement;
use std::fmt::Debug;

/// Score returned by a soft rule.
///
/// **Higher score = more desirable.** Built-in rules return values in
/// `0.0..=1.0` so weights are comparable.
pub type RuleScore = f64;

/// A soft constraint that rates a legal candidate placement.
pub trait SoftRule: Send + Sync + Debug {
    /// Rule name (e.g. `"PREF"`).
    fn name(&self) -> &'static str;

    /// Rates a candidate in the current search state.
    fn evaluate(&self, candidate: &Placement, context: &RankContext<'_>) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
