//! Coverage and worked-hours statistics over an indexed grid.
//!
//! Pure read models: nothing here mutates state, and every figure is
//! recomputed from the index on demand.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::grid::ScheduleIndex;
use crate::model::Employee;
use crate::shift::SlotClassifier;

/// Filled versus total cells for one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionCoverage {
    pub version: i32,
    pub filled_shifts: usize,
    pub total_shifts: usize,
    pub percentage: u8,
}

pub fn coverage(version: i32, index: &ScheduleIndex) -> VersionCoverage {
    let mut filled = 0usize;
    let mut total = 0usize;

    for entry in index.entries_for_version(version) {
        total += 1;
        if !entry.is_empty() {
            filled += 1;
        }
    }

    VersionCoverage {
        version,
        filled_shifts: filled,
        total_shifts: total,
        percentage: percentage(filled, total),
    }
}

/// Rounded percent; zero when there is nothing to cover.
fn percentage(filled: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((filled as f64 / total as f64) * 100.0).round() as u8
}

/// Worked hours for one employee in three alignments: the ISO week
/// containing the range start, the calendar month containing it, and
/// the closed range itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmployeeHours {
    pub employee_id: i64,
    pub weekly_hours: f64,
    pub monthly_hours: f64,
    pub total_hours: f64,
}

pub fn employee_hours(
    employee_id: i64,
    range: (NaiveDate, NaiveDate),
    index: &ScheduleIndex,
    classifier: &SlotClassifier,
) -> EmployeeHours {
    let (anchor, range_end) = range;
    let mut hours = EmployeeHours {
        employee_id,
        weekly_hours: 0.0,
        monthly_hours: 0.0,
        total_hours: 0.0,
    };

    for entry in index.employee_row(employee_id) {
        if entry.is_empty() {
            continue;
        }
        let duration = classifier.classify(entry, None).duration_hours;

        if entry.date.iso_week() == anchor.iso_week() {
            hours.weekly_hours += duration;
        }
        if entry.date.year() == anchor.year() && entry.date.month() == anchor.month() {
            hours.monthly_hours += duration;
        }
        if anchor <= entry.date && entry.date <= range_end {
            hours.total_hours += duration;
        }
    }

    hours
}

/// Weekly hours minus the contracted target. Negative means the
/// employee is under plan for that week.
pub fn contract_deviation(employee: &Employee, hours: &EmployeeHours) -> f64 {
    hours.weekly_hours - employee.contracted_hours
}
