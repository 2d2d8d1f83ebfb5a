//! Error types for timetable construction.
//!
//! Recoverable outcomes (bad input, no solution, budget exhausted,
//! cancellation) are distinct variants so that callers can decide whether to
//! edit the input, raise the budget, or give up. An invariant violation is a
//! defect in the engine and is never recoverable.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::models::Violation;
use crate::validation::ValidationError;

/// Main error type of a scheduling run.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// Input is malformed or incomplete; the search never started.
    #[error("invalid input: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// The search proved that at least one requirement cannot be met.
    #[error("no valid timetable exists: {0}")]
    Infeasible(FailureReport),

    /// The search hit its step or time bound without a proof either way.
    #[error("no timetable found within budget: {0}")]
    BudgetExceeded(FailureReport),

    /// The caller cancelled the run; partial state was discarded.
    #[error("scheduling run cancelled")]
    Cancelled,

    /// An accepted timetable broke a hard constraint. This is a bug.
    #[error("internal invariant violated: {}", join_violations(.0))]
    InvariantViolation(Vec<Violation>),
}

impl TimetableError {
    /// Whether the caller can retry with edited input or a larger budget.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TimetableError::InvariantViolation(_))
    }

    /// Failure report for infeasible or budget-exhausted runs.
    pub fn report(&self) -> Option<&FailureReport> {
        match self {
            TimetableError::Infeasible(r) | TimetableError::BudgetExceeded(r) => Some(r),
            _ => None,
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a run ended without a timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// All legal placements were exhausted.
    Infeasible,
    /// The step or time bound was reached first.
    BudgetExceeded,
}

/// A lesson requirement that could not be fully placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetRequirement {
    /// Class group id.
    pub class_id: String,
    /// Subject name.
    pub subject: String,
    /// Weekly occurrences required.
    pub required: usize,
    /// Occurrences placed in the deepest state reached.
    pub placed: usize,
    /// Known reason, when the requirement was rejected before search.
    pub reason: Option<String>,
}

impl UnmetRequirement {
    /// Occurrences still missing.
    pub fn shortfall(&self) -> usize {
        self.required.saturating_sub(self.placed)
    }
}

/// Structured report of a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Infeasibility or budget exhaustion.
    pub cause: FailureCause,
    /// Requirements that were short, ordered by class and subject.
    pub unmet: Vec<UnmetRequirement>,
    /// Most occurrences placed at any point of the search.
    pub best_placed: usize,
    /// Occurrences needed for a complete timetable.
    pub total_required: usize,
    /// Backtrack steps taken.
    pub backtracks: u64,
}

impl FailureReport {
    /// Whether the report names a given class/subject pair.
    pub fn names(&self, class_id: &str, subject: &str) -> bool {
        self.unmet
            .iter()
            .any(|u| u.class_id == class_id && u.subject.eq_ignore_ascii_case(subject))
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requirement(s) unmet ({}/{} occurrences placed, {} backtracks)",
            self.unmet.len(),
            self.best_placed,
            self.total_required,
            self.backtracks
        )?;
        for u in &self.unmet {
            write!(f, "; {}/{} short by {}", u.class_id, u.subject, u.shortfall())?;
            if let Some(reason) = &u.reason {
                write!(f, " ({reason})")?;
            }
        }
        Ok(())
    }
}
