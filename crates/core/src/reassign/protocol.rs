use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use tracing::debug;

use crate::conflict::{blocking_entry, find_absence};
use crate::grid::ScheduleIndex;
use crate::model::{
    AbsenceRecord, RejectKind, ScheduleEntry, ScheduleUpdate, VersionMeta, VersionStatus,
};
use crate::shift::TimeWindow;

/// A drag-and-drop reassignment, expressed as a plain message from the
/// source entry to the target cell.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRequest {
    pub source_schedule_id: i64,
    pub target_employee_id: i64,
    pub target_date: NaiveDate,
    /// None keeps the source entry's shift.
    pub target_shift_id: Option<i64>,
    /// None keeps the source entry's times.
    pub target_window: Option<TimeWindow>,
}

/// In-place edit of times, break, or notes on an existing entry. None
/// keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditRequest {
    pub schedule_id: i64,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// Why a proposed mutation did not become an update. Everything here is
/// an expected interaction outcome, not a failure of the engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RejectReason {
    #[error("version {version} is {status:?}; only drafts accept changes")]
    VersionLocked { version: i32, status: VersionStatus },
    #[error("employee {employee_id} is absent on {date} ({absence_type_id})")]
    AbsenceConflict {
        employee_id: i64,
        date: NaiveDate,
        absence_type_id: String,
    },
    #[error("target cell is taken by schedule entry {occupied_by}")]
    SlotConflict {
        occupied_by: i64,
        employee_id: i64,
        date: NaiveDate,
    },
    #[error("proposal {proposal_id} was superseded")]
    StaleProposal { proposal_id: u64 },
    #[error("dispatch failed: {message}")]
    UpstreamFailure { message: String },
}

impl From<&RejectReason> for RejectKind {
    fn from(reason: &RejectReason) -> Self {
        match reason {
            RejectReason::VersionLocked { .. } => RejectKind::VersionLocked,
            RejectReason::AbsenceConflict { .. } => RejectKind::AbsenceConflict,
            RejectReason::SlotConflict { .. } => RejectKind::SlotConflict,
            RejectReason::StaleProposal { .. } => RejectKind::StaleProposal,
            RejectReason::UpstreamFailure { .. } => RejectKind::UpstreamFailure,
        }
    }
}

/// Checks a move in precedence order: version lock, then absence on the
/// target day, then slot occupancy. The first failing check names the
/// reject; later ones are not evaluated.
pub fn propose_move(
    source: &ScheduleEntry,
    version: &VersionMeta,
    request: &MoveRequest,
    index: &ScheduleIndex,
    absences: &[AbsenceRecord],
) -> Result<ScheduleUpdate, RejectReason> {
    ensure_draft(version)?;

    if let Some(absence) = find_absence(request.target_employee_id, request.target_date, absences) {
        return Err(RejectReason::AbsenceConflict {
            employee_id: request.target_employee_id,
            date: request.target_date,
            absence_type_id: absence.absence_type_id.clone(),
        });
    }

    let window = request.target_window.or_else(|| TimeWindow::of_entry(source));
    let occupant = index.cell(request.target_employee_id, request.target_date);
    if let Some(blocking) = blocking_entry(occupant, source.id, window.as_ref()) {
        return Err(RejectReason::SlotConflict {
            occupied_by: blocking.id,
            employee_id: request.target_employee_id,
            date: request.target_date,
        });
    }

    debug!(
        schedule_id = source.id,
        employee_id = request.target_employee_id,
        date = %request.target_date,
        "move accepted"
    );

    Ok(ScheduleUpdate {
        employee_id: request.target_employee_id,
        date: request.target_date,
        shift_id: request.target_shift_id.or(source.shift_id),
        shift_start: window.map(|window| window.start),
        shift_end: window.map(|window| window.end),
        break_start: source.break_start,
        break_end: source.break_end,
        notes: source.notes.clone(),
    })
}

/// Clearing a cell is a reassignment to the empty shift. Only the
/// version lock applies; an absent or double-booked employee can always
/// be unassigned.
pub fn propose_clear(
    source: &ScheduleEntry,
    version: &VersionMeta,
) -> Result<ScheduleUpdate, RejectReason> {
    ensure_draft(version)?;

    debug!(schedule_id = source.id, "clear accepted");

    Ok(ScheduleUpdate {
        employee_id: source.employee_id,
        date: source.date,
        shift_id: None,
        shift_start: None,
        shift_end: None,
        break_start: None,
        break_end: None,
        notes: None,
    })
}

/// An edit keeps the entry in its cell but may change its window, so
/// occupancy is re-checked against everything else in that cell.
pub fn propose_edit(
    source: &ScheduleEntry,
    version: &VersionMeta,
    request: &EditRequest,
    index: &ScheduleIndex,
) -> Result<ScheduleUpdate, RejectReason> {
    ensure_draft(version)?;

    let shift_start = request.shift_start.or(source.shift_start);
    let shift_end = request.shift_end.or(source.shift_end);
    let window = match (shift_start, shift_end) {
        (Some(start), Some(end)) => Some(TimeWindow::new(start, end)),
        _ => None,
    };

    let occupant = index.cell(source.employee_id, source.date);
    if let Some(blocking) = blocking_entry(occupant, source.id, window.as_ref()) {
        return Err(RejectReason::SlotConflict {
            occupied_by: blocking.id,
            employee_id: source.employee_id,
            date: source.date,
        });
    }

    Ok(ScheduleUpdate {
        employee_id: source.employee_id,
        date: source.date,
        shift_id: source.shift_id,
        shift_start,
        shift_end,
        break_start: request.break_start.or(source.break_start),
        break_end: request.break_end.or(source.break_end),
        notes: request.notes.clone().or_else(|| source.notes.clone()),
    })
}

fn ensure_draft(version: &VersionMeta) -> Result<(), RejectReason> {
    if version.status != VersionStatus::Draft {
        return Err(RejectReason::VersionLocked {
            version: version.version,
            status: version.status,
        });
    }
    Ok(())
}
