use std::collections::HashMap;

use thiserror::Error;

use crate::model::{AbsenceRecord, Employee, PlanSettings};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanStoreError {
    #[error("employee {id} not found")]
    EmployeeNotFound { id: i64 },
    #[error("plan settings unavailable: {message}")]
    SettingsUnavailable { message: String },
    #[error("plan store operation failed: {message}")]
    OperationFailed { message: String },
}

/// Read access to the directory data a plan view needs. Schedule entries
/// and versions go through their own write seams; this trait stays
/// read-only.
pub trait PlanStore {
    fn employees(&self) -> Result<Vec<Employee>, PlanStoreError>;

    fn absences_for(&self, employee_id: i64) -> Result<Vec<AbsenceRecord>, PlanStoreError>;

    fn settings(&self) -> Result<PlanSettings, PlanStoreError>;

    /// Absences for every known employee, keyed by employee id.
    fn absence_map(&self) -> Result<HashMap<i64, Vec<AbsenceRecord>>, PlanStoreError> {
        let mut map = HashMap::new();
        for employee in self.employees()? {
            map.insert(employee.id, self.absences_for(employee.id)?);
        }
        Ok(map)
    }
}
