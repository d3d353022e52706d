use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::schedule::{date_key, opt_hhmm};

/// One absence span for an employee. Both boundary dates are inclusive.
/// Times, when present, are informational only; conflict checks work on
/// whole days.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbsenceRecord {
    pub employee_id: i64,
    #[serde(with = "date_key")]
    pub start_date: NaiveDate,
    #[serde(with = "date_key")]
    pub end_date: NaiveDate,
    pub absence_type_id: String,
    #[serde(default, with = "opt_hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "opt_hhmm")]
    pub end_time: Option<NaiveTime>,
}

impl AbsenceRecord {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
