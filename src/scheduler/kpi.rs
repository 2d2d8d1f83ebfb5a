//! Timetable quality metrics (KPIs).
//!
//! Computes coverage and balance indicators from a finished timetable and
//! the problem it solves. A timetable that passed verification is already
//! valid; these numbers describe how good it is.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total slots | classes × days × lectures per day |
//! | Filled slots | class lecture slots covered by a lesson |
//! | Fill rate | filled / total |
//! | Faculty load | lecture slots taught per faculty per week |
//! | Room utilization | occupied / weekly lecture slots, per room |
//! | Idle gaps | empty lectures between two lessons of a class on one day |
//!
//! # Warnings
//! - `UnevenWorkload`: a faculty member teaches more than 1.5 × the average
//!   load of faculty who teach at all.
//! - `LowFillRate`: fewer than half of the class slots are used.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Day, Problem, Timetable};

/// Load above this multiple of the average is flagged.
pub const UNEVEN_WORKLOAD_FACTOR: f64 = 1.5;

/// Fill rates below this are flagged.
pub const LOW_FILL_RATE: f64 = 0.5;

/// Quality warning about an otherwise valid timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KpiWarning {
    /// A faculty member carries much more than the average load.
    UnevenWorkload {
        faculty: String,
        load: usize,
        average: f64,
    },
    /// Most class slots are empty.
    LowFillRate { fill_rate: f64 },
}

/// Timetable performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableKpi {
    /// Class lecture slots in the week.
    pub total_slots: usize,
    /// Class lecture slots with a lesson.
    pub filled_slots: usize,
    /// Class lecture slots without a lesson.
    pub empty_slots: usize,
    /// Fraction of filled class slots (0.0..=1.0).
    pub fill_rate: f64,
    /// Lecture slots taught per faculty short code (zero for idle faculty).
    pub faculty_load: BTreeMap<String, usize>,
    /// Fraction of weekly lecture slots each room is occupied.
    pub room_utilization: BTreeMap<String, f64>,
    /// Empty lectures sandwiched between lessons, per class.
    pub idle_gaps: BTreeMap<String, usize>,
    /// Quality warnings.
    pub warnings: Vec<KpiWarning>,
}

impl TimetableKpi {
    /// Computes KPIs for a timetable.
    pub fn calculate(problem: &Problem, timetable: &Timetable) -> Self {
        let lectures = problem.lectures_per_day();
        let week = lectures * Day::COUNT;
        let total_slots = problem.classes().len() * week;
        let filled_slots: usize = timetable.assignments().iter().map(|a| a.duration).sum();
        let fill_rate = if total_slots == 0 {
            0.0
        } else {
            filled_slots as f64 / total_slots as f64
        };

        let faculty_load: BTreeMap<String, usize> = problem
            .faculty()
            .iter()
            .map(|f| (f.short.clone(), timetable.faculty_load(&f.short)))
            .collect();

        let room_utilization = problem
            .rooms()
            .iter()
            .map(|r| {
                let used: usize = timetable.for_room(&r.id).iter().map(|a| a.duration).sum();
                let rate = if week == 0 {
                    0.0
                } else {
                    used as f64 / week as f64
                };
                (r.id.clone(), rate)
            })
            .collect();

        let idle_gaps = problem
            .classes()
            .iter()
            .map(|c| {
                let gaps = Day::ALL
                    .iter()
                    .map(|&day| {
                        let busy: Vec<bool> = (0..lectures)
                            .map(|l| timetable.entry_at(&c.id, day, l).is_some())
                            .collect();
                        count_gaps(&busy)
                    })
                    .sum();
                (c.id.clone(), gaps)
            })
            .collect();

        let mut warnings = Vec::new();
        let teaching: Vec<usize> = faculty_load.values().copied().filter(|&l| l > 0).collect();
        if !teaching.is_empty() {
            let average = teaching.iter().sum::<usize>() as f64 / teaching.len() as f64;
            for (faculty, &load) in &faculty_load {
                if load as f64 > UNEVEN_WORKLOAD_FACTOR * average {
                    warnings.push(KpiWarning::UnevenWorkload {
                        faculty: faculty.clone(),
                        load,
                        average,
                    });
                }
            }
        }
        if total_slots > 0 && fill_rate < LOW_FILL_RATE {
            warnings.push(KpiWarning::LowFillRate { fill_rate });
        }

        Self {
            total_slots,
            filled_slots,
            empty_slots: total_slots.saturating_sub(filled_slots),
            fill_rate,
            faculty_load,
            room_utilization,
            idle_gaps,
            warnings,
        }
    }

    /// Average room utilization over all rooms.
    pub fn avg_room_utilization(&self) -> f64 {
        if self.room_utilization.is_empty() {
            0.0
        } else {
            self.room_utilization.values().sum::<f64>() / self.room_utilization.len() as f64
        }
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_fill_rate: f64, max_idle_gaps: usize) -> bool {
        self.fill_rate >= min_fill_rate && self.idle_gaps.values().all(|&g| g <= max_idle_gaps)
    }
}

/// Free lectures with a busy lecture somewhere before and after.
fn count_gaps(busy: &[bool]) -> usize {
    let (Some(first), Some(last)) = (
        busy.iter().position(|&b| b),
        busy.iter().rposition(|&b| b),
    ) else {
        return 0;
    };
    busy[first..=last].iter().filter(|&&b| !b).count()
}
