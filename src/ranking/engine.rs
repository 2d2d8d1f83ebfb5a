//! Weighted rule engine for candidate ordering.
//!
//! Combines soft rules as a weighted sum and sorts candidates best first.
//! Ties are broken by day, start slot, faculty short code and room id, so
//! identical inputs always produce identical orderings.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, RankContext, RuleScore, SoftRule};
use crate::availability::Placement;

/// Weights of the built-in soft rules.
///
/// These are a default policy, not a fixed contract. A weight of zero
/// disables the rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankWeights {
    /// Faculty preference rank.
    pub preference: f64,
    /// Faculty load balance.
    pub load: f64,
    /// Class day contiguity.
    pub contiguity: f64,
    /// Subject spread over the week.
    pub spread: f64,
    /// Room of the subject's natural kind. Outweighs the other defaults
    /// together, so lectures only take a lab room when no classroom is
    /// free.
    pub room_fit: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            preference: 10.0,
            load: 1.0,
            contiguity: 0.5,
            spread: 2.0,
            room_fit: 20.0,
        }
    }
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn SoftRule>,
    weight: f64,
}

/// Orders candidate placements by weighted soft-rule score.
///
/// # Example
/// ```
/// use u_timetable::ranking::{RankEngine, RankWeights};
///
/// let engine = RankEngine::from_weights(&RankWeights::default());
/// assert_eq!(engine.rule_count(), 5);
/// ```
#[derive(Clone)]
pub struct RankEngine {
    rules: Vec<WeightedRule>,
}

impl RankEngine {
    /// Creates an engine with no rules (every candidate ties).
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Builds an engine from the built-in rules, skipping zero weights.
    pub fn from_weights(weights: &RankWeights) -> Self {
        let mut engine = Self::new();
        if weights.preference != 0.0 {
            engine = engine.with_rule(rules::FacultyPreference, weights.preference);
        }
        if weights.load != 0.0 {
            engine = engine.with_rule(rules::LoadBalance, weights.load);
        }
        if weights.contiguity != 0.0 {
            engine = engine.with_rule(rules::Contiguity, weights.contiguity);
        }
        if weights.spread != 0.0 {
            engine = engine.with_rule(rules::DaySpread, weights.spread);
        }
        if weights.room_fit != 0.0 {
            engine = engine.with_rule(rules::RoomFit, weights.room_fit);
        }
        engine
    }

    /// Adds a weighted rule.
    pub fn with_rule<R: SoftRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Weighted score of each rule for a candidate.
    pub fn evaluate(&self, candidate: &Placement, context: &RankContext<'_>) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(candidate, context) * wr.weight)
            .collect()
    }

    /// Total weighted score of a candidate.
    pub fn score(&self, candidate: &Placement, context: &RankContext<'_>) -> RuleScore {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(candidate, context) * wr.weight)
            .sum()
    }

    /// Sorts candidates best first. Scores are compared with
    /// [`f64::total_cmp`], so a NaN weight still yields a total order.
    pub fn rank(&self, candidates: Vec<Placement>, context: &RankContext<'_>) -> Vec<Placement> {
        let mut scored: Vec<(RuleScore, Placement)> = candidates
            .into_iter()
            .map(|c| (self.score(&c, context), c))
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| {
            sb.total_cmp(sa).then_with(|| tie_break(a, b, context))
        });

        scored.into_iter().map(|(_, c)| c).collect()
    }
}

fn tie_break(a: &Placement, b: &Placement, context: &RankContext<'_>) -> Ordering {
    let faculty = context.problem.faculty();
    let rooms = context.problem.rooms();
    a.day
        .cmp(&b.day)
        .then(a.start.cmp(&b.start))
        .then_with(|| faculty[a.faculty].short.cmp(&faculty[b.faculty].short))
        .then_with(|| rooms[a.room].id.cmp(&rooms[b.room].id))
}

impl Default for RankEngine {
    fn default() -> Self {
        Self::from_weights(&RankWeights::default())
    }
}

impl std::fmt::Debug for RankEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
