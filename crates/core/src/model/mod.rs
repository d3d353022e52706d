//! Domain model shared across the scheduling engine.
//!
//! Everything here mirrors what the surrounding services exchange on the
//! wire: schedule entries, employees, absences, plan versions, and store
//! settings, plus the scenario format the test harness consumes.

pub mod absence;
pub mod employee;
pub mod plan_store;
pub mod schedule;
pub mod settings;
pub mod test_scenario;
pub mod version;

pub use absence::AbsenceRecord;
pub use employee::{Employee, GroupDef};
pub use plan_store::{PlanStore, PlanStoreError};
pub use schedule::{ScheduleEntry, ScheduleUpdate, ShiftType};
pub use settings::{PlanSettings, ShiftTypeDef};
pub use test_scenario::{
    CellMismatch, CoverageExpectation, CoverageMismatch, DispatchScript, ErrorType, ExpectedCell,
    ExpectedState, ExpectedVersion, GridSnapshot, MatchMode, MismatchType, PlanScenario,
    RejectKind, StepAction, StepDef, StepMismatch, StepOutcome, SuiteResult, TestConfig,
    TestErrorDetail, TestResult, TestStatus, VersionMismatch,
};
pub use version::{VersionMeta, VersionStatus};
