use serde::Serialize;

use crate::model::{AbsenceRecord, ScheduleEntry, ShiftType};

/// Everything a renderer needs to paint one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellState {
    pub entry: Option<ScheduleEntry>,
    pub absence: Option<AbsenceRecord>,
    pub shift_type: Option<ShiftType>,
    pub duration_hours: f64,
}

impl CellState {
    pub fn empty() -> Self {
        Self {
            entry: None,
            absence: None,
            shift_type: None,
            duration_hours: 0.0,
        }
    }

    pub fn has_absence(&self) -> bool {
        self.absence.is_some()
    }

    pub fn is_filled(&self) -> bool {
        self.entry.as_ref().is_some_and(|entry| !entry.is_empty())
    }
}
