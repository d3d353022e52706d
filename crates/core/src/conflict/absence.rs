use chrono::NaiveDate;

use crate::model::AbsenceRecord;

/// First absence covering `date` for `employee_id`, in input order.
/// Overlapping records are possible upstream; the first one is the one
/// reported everywhere, so the choice stays stable within a fetch.
pub fn find_absence(
    employee_id: i64,
    date: NaiveDate,
    absences: &[AbsenceRecord],
) -> Option<&AbsenceRecord> {
    absences
        .iter()
        .find(|record| record.employee_id == employee_id && record.covers(date))
}
