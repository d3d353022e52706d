use anyhow::{bail, Context, Result};

use crate::model::ScheduleEntry;

/// Structural checks on one wire record. Anything failing here is bad
/// data from the schedule service, not a user interaction to reject.
pub fn validate_entry(entry: &ScheduleEntry) -> Result<()> {
    if entry.employee_id <= 0 {
        bail!("schedule entry {} has no employee", entry.id);
    }
    if entry.version <= 0 {
        bail!("schedule entry {} has no version", entry.id);
    }
    if let Some(shift_id) = entry.shift_id {
        if shift_id <= 0 {
            bail!("schedule entry {} references shift {}", entry.id, shift_id);
        }
    }
    if entry.shift_start.is_some() != entry.shift_end.is_some() {
        bail!("schedule entry {} has a half-specified shift window", entry.id);
    }
    if entry.break_start.is_some() != entry.break_end.is_some() {
        bail!("schedule entry {} has a half-specified break", entry.id);
    }
    if entry.break_start.is_some() && entry.shift_start.is_none() {
        bail!("schedule entry {} has a break without shift times", entry.id);
    }

    Ok(())
}

pub fn validate_entries(entries: &[ScheduleEntry]) -> Result<()> {
    for (position, entry) in entries.iter().enumerate() {
        validate_entry(entry).with_context(|| format!("entry at position {position}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn valid_entry() -> ScheduleEntry {
        ScheduleEntry {
            id: 1,
            employee_id: 7,
            shift_id: Some(3),
            version: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            shift_start: Some(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
            shift_end: Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap()),
            break_start: None,
            break_end: None,
            shift_type_id: None,
            notes: None,
        }
    }

    #[test]
    fn accepts_a_complete_entry() {
        assert!(validate_entry(&valid_entry()).is_ok());
    }

    #[test]
    fn accepts_an_empty_cell_without_times() {
        let mut entry = valid_entry();
        entry.shift_id = None;
        entry.shift_start = None;
        entry.shift_end = None;
        assert!(validate_entry(&entry).is_ok());
    }

    #[test]
    fn rejects_missing_employee() {
        let mut entry = valid_entry();
        entry.employee_id = 0;
        let error = validate_entry(&entry).unwrap_err();
        assert!(error.to_string().contains("no employee"));
    }

    #[test]
    fn rejects_half_specified_window() {
        let mut entry = valid_entry();
        entry.shift_end = None;
        let error = validate_entry(&entry).unwrap_err();
        assert!(error.to_string().contains("half-specified shift window"));
    }

    #[test]
    fn rejects_break_without_shift_times() {
        let mut entry = valid_entry();
        entry.shift_start = None;
        entry.shift_end = None;
        entry.break_start = Some(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        entry.break_end = Some(NaiveTime::from_hms_opt(12, 30, 0).unwrap());
        let error = validate_entry(&entry).unwrap_err();
        assert!(error.to_string().contains("break without shift times"));
    }

    #[test]
    fn batch_error_names_the_position() {
        let mut broken = valid_entry();
        broken.id = 2;
        broken.version = 0;
        let entries = vec![valid_entry(), broken];

        let error = validate_entries(&entries).unwrap_err();
        assert!(format!("{error:#}").contains("position 1"));
    }
}
