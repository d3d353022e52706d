use chrono::{NaiveDate, NaiveTime};
use rota_core::engine::PlanBoard;
use rota_core::model::{ScheduleEntry, ScheduleUpdate, VersionMeta};
use rota_core::shift::SlotClassifier;

#[allow(dead_code)]
pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).expect("date")
}

#[allow(dead_code)]
pub fn t(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).expect("time")
}

#[allow(dead_code)]
pub fn entry(id: i64, employee_id: i64, day: u32, version: i32) -> ScheduleEntry {
    ScheduleEntry {
        id,
        employee_id,
        shift_id: Some(3),
        version,
        date: date(day),
        shift_start: Some(t(9)),
        shift_end: Some(t(17)),
        break_start: None,
        break_end: None,
        shift_type_id: None,
        notes: None,
    }
}

#[allow(dead_code)]
pub fn empty_cell(id: i64, employee_id: i64, day: u32, version: i32) -> ScheduleEntry {
    let mut cell = entry(id, employee_id, day, version);
    cell.shift_id = None;
    cell.shift_start = None;
    cell.shift_end = None;
    cell
}

#[allow(dead_code)]
pub fn draft_board(entries: Vec<ScheduleEntry>) -> PlanBoard {
    let highest = entries.iter().map(|e| e.version).max().unwrap_or(1);
    let mut board = PlanBoard::new(SlotClassifier::default());
    board.load_versions((1..=highest).map(VersionMeta::draft).collect());
    board.load_entries(entries).expect("seed entries");
    board.set_active_version(1).expect("active version");
    board
}

/// The entry the schedule service would persist and answer with for a
/// confirmed update.
#[allow(dead_code)]
pub fn persisted(schedule_id: i64, version: i32, update: &ScheduleUpdate) -> ScheduleEntry {
    ScheduleEntry {
        id: schedule_id,
        employee_id: update.employee_id,
        shift_id: update.shift_id,
        version,
        date: update.date,
        shift_start: update.shift_start,
        shift_end: update.shift_end,
        break_start: update.break_start,
        break_end: update.break_end,
        shift_type_id: None,
        notes: update.notes.clone(),
    }
}
