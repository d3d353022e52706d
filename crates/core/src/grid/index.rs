use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::ScheduleEntry;

/// Immutable employee/date snapshot over a flat entry list.
///
/// The index is rebuilt whenever the source list changes, never patched
/// in place. Colliding (employee, date) keys collapse through
/// [`prefers_over`], so a fully hydrated record survives contact with a
/// partial optimistic artifact regardless of input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleIndex {
    cells: BTreeMap<i64, BTreeMap<NaiveDate, ScheduleEntry>>,
    len: usize,
}

impl ScheduleIndex {
    pub fn build(entries: &[ScheduleEntry]) -> Self {
        let mut cells: BTreeMap<i64, BTreeMap<NaiveDate, ScheduleEntry>> = BTreeMap::new();
        let mut len = 0usize;

        for entry in entries {
            let row = cells.entry(entry.employee_id).or_default();
            match row.get(&entry.date) {
                None => {
                    row.insert(entry.date, entry.clone());
                    len += 1;
                }
                Some(existing) if prefers_over(entry, existing) => {
                    row.insert(entry.date, entry.clone());
                }
                Some(_) => {}
            }
        }

        Self { cells, len }
    }

    pub fn cell(&self, employee_id: i64, date: NaiveDate) -> Option<&ScheduleEntry> {
        self.cells.get(&employee_id)?.get(&date)
    }

    pub fn employee_row(&self, employee_id: i64) -> impl Iterator<Item = &ScheduleEntry> {
        self.cells
            .get(&employee_id)
            .into_iter()
            .flat_map(|row| row.values())
    }

    pub fn entry_by_id(&self, schedule_id: i64) -> Option<&ScheduleEntry> {
        self.iter().find(|entry| entry.id == schedule_id)
    }

    pub fn entries_for_version(&self, version: i32) -> impl Iterator<Item = &ScheduleEntry> {
        self.iter().filter(move |entry| entry.version == version)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.cells.values().flat_map(|row| row.values())
    }

    /// All cells in employee-then-date order. The order is part of the
    /// contract; reports and snapshots rely on it.
    pub fn flatten(&self) -> Vec<ScheduleEntry> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Merge precedence for duplicate (employee, date) keys: a record with a
/// shift and times beats one with only a shift, which beats an empty
/// cell. Ties keep the record seen first.
fn prefers_over(candidate: &ScheduleEntry, existing: &ScheduleEntry) -> bool {
    completeness(candidate) > completeness(existing)
}

fn completeness(entry: &ScheduleEntry) -> u8 {
    match (entry.shift_id.is_some(), entry.shift_start.is_some()) {
        (true, true) => 2,
        (true, false) => 1,
        (false, _) => 0,
    }
}
