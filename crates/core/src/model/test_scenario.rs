use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::schedule::opt_hhmm;
use super::{
    AbsenceRecord, Employee, GroupDef, PlanSettings, ScheduleEntry, VersionMeta, VersionStatus,
};

// ============================================================================
// Core Plan Scenario Definition
// ============================================================================

/// Complete plan scenario definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanScenario {
    /// Human-readable scenario name
    pub name: String,

    /// Narrative description of what is being tested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Store configuration backing the classifier and opening checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<PlanSettings>,

    /// Group catalog the directory references resolve against, when
    /// present
    #[serde(default)]
    pub groups: Vec<GroupDef>,

    /// Employee directory for the plan view
    #[serde(default)]
    pub employees: Vec<Employee>,

    /// Absence records the conflict checks run against
    #[serde(default)]
    pub absences: Vec<AbsenceRecord>,

    /// Plan versions available to the board
    pub versions: Vec<VersionMeta>,

    /// Version shown on the board; defaults to the lowest number
    #[serde(default)]
    pub active_version: Option<i32>,

    /// Seeded schedule entries
    #[serde(default)]
    pub entries: Vec<ScheduleEntry>,

    /// Scripted actions, executed in order
    #[serde(default)]
    pub steps: Vec<StepDef>,

    /// Expected end state for comparison
    pub expected: ExpectedState,

    /// Test behavior configuration (has defaults)
    #[serde(default)]
    pub config: TestConfig,
}

impl PlanScenario {
    /// Validate the scenario structure
    pub fn validate(&self) -> Result<()> {
        if self.versions.is_empty() {
            bail!("PlanScenario must have at least one version");
        }

        let mut version_numbers: HashSet<i32> = HashSet::new();
        for meta in &self.versions {
            if !version_numbers.insert(meta.version) {
                bail!("duplicate version number {}", meta.version);
            }
        }

        if let Some(active) = self.active_version {
            if !version_numbers.contains(&active) {
                bail!("active_version {} is not among the declared versions", active);
            }
        }

        if !self.groups.is_empty() {
            let employee_types: HashSet<&str> = self
                .groups
                .iter()
                .filter(|def| matches!(def, GroupDef::EmployeeType { .. }))
                .map(|def| def.id())
                .collect();
            let absence_types: HashSet<&str> = self
                .groups
                .iter()
                .filter(|def| matches!(def, GroupDef::AbsenceType { .. }))
                .map(|def| def.id())
                .collect();

            for employee in &self.employees {
                if !employee_types.contains(employee.employee_group.as_str()) {
                    bail!(
                        "employee {} has group {}, which the catalog does not define",
                        employee.id,
                        employee.employee_group
                    );
                }
            }
            for absence in &self.absences {
                if !absence_types.contains(absence.absence_type_id.as_str()) {
                    bail!(
                        "absence for employee {} has type {}, which the catalog does not define",
                        absence.employee_id,
                        absence.absence_type_id
                    );
                }
            }
        }

        let employee_ids: HashSet<i64> = self.employees.iter().map(|e| e.id).collect();

        let mut entry_ids: HashSet<i64> = HashSet::new();
        for (position, entry) in self.entries.iter().enumerate() {
            crate::validation::validate_entry(entry)
                .with_context(|| format!("entry at position {position}"))?;

            if entry.id != 0 && !entry_ids.insert(entry.id) {
                bail!("duplicate schedule entry id {}", entry.id);
            }
            if !version_numbers.contains(&entry.version) {
                bail!(
                    "entry {} references undeclared version {}",
                    entry.id,
                    entry.version
                );
            }
            if !self.employees.is_empty() && !employee_ids.contains(&entry.employee_id) {
                bail!(
                    "entry {} references unknown employee {}",
                    entry.id,
                    entry.employee_id
                );
            }
        }

        if !self.employees.is_empty() {
            for absence in &self.absences {
                if !employee_ids.contains(&absence.employee_id) {
                    bail!("absence references unknown employee {}", absence.employee_id);
                }
            }
        }

        for (position, step) in self.steps.iter().enumerate() {
            step.validate(position, &self.steps, &employee_ids)
                .with_context(|| format!("step {}", position + 1))?;
        }

        let mut expected_keys: HashSet<(i64, NaiveDate)> = HashSet::new();
        for cell in &self.expected.cells {
            if !expected_keys.insert((cell.employee_id, cell.date)) {
                bail!(
                    "expected.cells lists employee {} on {} twice",
                    cell.employee_id,
                    cell.date
                );
            }
            if cell.shift_start.is_some() != cell.shift_end.is_some() {
                bail!(
                    "expected cell for employee {} on {} has a half-specified window",
                    cell.employee_id,
                    cell.date
                );
            }
        }

        if let Some(coverage) = &self.expected.coverage {
            if coverage.percentage > 100 {
                bail!("expected coverage cannot exceed 100 percent");
            }
        }

        Ok(())
    }
}

// ============================================================================
// Step Definitions
// ============================================================================

/// One scripted action against the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDef {
    /// The action to perform
    #[serde(flatten)]
    pub action: StepAction,

    /// Expected settlement of this step
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub expect: StepOutcome,

    /// Scripted behavior of the persistence collaborator
    #[serde(default)]
    pub dispatch: DispatchScript,
}

impl StepDef {
    fn validate(
        &self,
        position: usize,
        steps: &[StepDef],
        employee_ids: &HashSet<i64>,
    ) -> Result<()> {
        if self.dispatch != DispatchScript::Succeed && !self.action.is_cell_mutation() {
            bail!("dispatch scripting only applies to cell mutations");
        }

        match &self.action {
            StepAction::Move {
                target_employee_id,
                shift_start,
                shift_end,
                ..
            } => {
                if !employee_ids.is_empty() && !employee_ids.contains(target_employee_id) {
                    bail!("move targets unknown employee {}", target_employee_id);
                }
                if shift_start.is_some() != shift_end.is_some() {
                    bail!("move has a half-specified target window");
                }
            }
            StepAction::Settle { step } => {
                if *step == 0 || *step > position {
                    bail!("settle must reference an earlier step, got {}", step);
                }
                let referenced = &steps[*step - 1];
                if referenced.dispatch != DispatchScript::Drop {
                    bail!("settle requires step {} to use dispatch: drop", step);
                }
            }
            _ => {}
        }

        Ok(())
    }
}

/// Board action performed by a step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    /// Drag an entry onto another cell
    Move {
        source_schedule_id: i64,
        target_employee_id: i64,
        target_date: NaiveDate,
        #[serde(default)]
        target_shift_id: Option<i64>,
        #[serde(default, with = "opt_hhmm")]
        shift_start: Option<NaiveTime>,
        #[serde(default, with = "opt_hhmm")]
        shift_end: Option<NaiveTime>,
    },

    /// Empty a cell while keeping the row
    Clear { schedule_id: i64 },

    /// Edit times, break, or notes in place
    Edit {
        schedule_id: i64,
        #[serde(default, with = "opt_hhmm")]
        shift_start: Option<NaiveTime>,
        #[serde(default, with = "opt_hhmm")]
        shift_end: Option<NaiveTime>,
        #[serde(default, with = "opt_hhmm")]
        break_start: Option<NaiveTime>,
        #[serde(default, with = "opt_hhmm")]
        break_end: Option<NaiveTime>,
        #[serde(default)]
        notes: Option<String>,
    },

    /// Publish a draft version
    Publish { version: i32 },

    /// Archive a draft or published version
    Archive { version: i32 },

    /// Delete a version and its entries
    DeleteVersion { version: i32 },

    /// Duplicate a version into a fresh draft
    DuplicateVersion { version: i32 },

    /// Change a draft version's notes
    UpdateNotes {
        version: i32,
        #[serde(default)]
        notes: Option<String>,
    },

    /// Deliver the withheld dispatch response of an earlier step
    Settle { step: usize },
}

impl StepAction {
    pub fn label(&self) -> &'static str {
        match self {
            StepAction::Move { .. } => "move",
            StepAction::Clear { .. } => "clear",
            StepAction::Edit { .. } => "edit",
            StepAction::Publish { .. } => "publish",
            StepAction::Archive { .. } => "archive",
            StepAction::DeleteVersion { .. } => "delete_version",
            StepAction::DuplicateVersion { .. } => "duplicate_version",
            StepAction::UpdateNotes { .. } => "update_notes",
            StepAction::Settle { .. } => "settle",
        }
    }

    pub fn is_cell_mutation(&self) -> bool {
        matches!(
            self,
            StepAction::Move { .. } | StepAction::Clear { .. } | StepAction::Edit { .. }
        )
    }
}

/// How a step settled, also used as the expectation for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// The mutation was confirmed and applied to the grid
    #[default]
    Applied,
    /// The dispatch response is withheld; nothing settled yet
    Pending,
    /// The confirmation arrived after a newer proposal and was discarded
    Stale,
    /// A precondition rejected the proposal
    Rejected(RejectKind),
    /// The lifecycle table rejected a version action
    IllegalTransition,
    /// The collaborator failed and the proposal rolled back
    DispatchFailed,
}

/// Reject taxonomy mirrored into scenario files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectKind {
    VersionLocked,
    AbsenceConflict,
    SlotConflict,
    StaleProposal,
    UpstreamFailure,
}

/// Scripted behavior of the persistence collaborator for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DispatchScript {
    /// Dispatch succeeds and the response settles immediately
    #[default]
    Succeed,
    /// Dispatch fails with a retryable error
    Fail,
    /// Dispatch succeeds but the response is withheld until a settle step
    Drop,
}

// ============================================================================
// Expected State
// ============================================================================

/// Expected end state of the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedState {
    /// Cells the final grid must contain
    #[serde(default)]
    pub cells: Vec<ExpectedCell>,

    /// Version table after all steps ran. When present the list is
    /// exhaustive, so a deleted version is asserted by leaving it out.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<ExpectedVersion>,

    /// Coverage figure for one version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageExpectation>,
}

/// One expected grid cell. Omitted times assert the cell has none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpectedCell {
    pub employee_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub shift_id: Option<i64>,
    #[serde(default, with = "opt_hhmm")]
    pub shift_start: Option<NaiveTime>,
    #[serde(default, with = "opt_hhmm")]
    pub shift_end: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpectedVersion {
    pub version: i32,
    pub status: VersionStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoverageExpectation {
    pub version: i32,
    pub percentage: u8,
}

// ============================================================================
// Test Configuration
// ============================================================================

/// Controls comparison behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    /// Cell matching strategy
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Save the actual end state on failure
    #[serde(default = "default_snapshot_on_failure")]
    pub snapshot_on_failure: bool,
}

fn default_snapshot_on_failure() -> bool {
    true
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Exact,
            snapshot_on_failure: true,
        }
    }
}

/// Cell matching strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// All cells must match exactly; no extra cells allowed
    #[default]
    Exact,
    /// Expected cells must exist in the grid; extra cells tolerated
    Subset,
}

// ============================================================================
// Test Result
// ============================================================================

/// Output of scenario execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Name from PlanScenario
    pub scenario_name: String,

    /// Pass/Fail/Error
    pub status: TestStatus,

    /// Non-fatal warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Steps whose settlement differed from the expectation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub step_mismatches: Vec<StepMismatch>,

    /// Cell-level mismatches in the final grid
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cell_mismatches: Vec<CellMismatch>,

    /// Version status mismatches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub version_mismatches: Vec<VersionMismatch>,

    /// Coverage mismatch, when an expectation was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_mismatch: Option<CoverageMismatch>,

    /// Present only when status is Error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TestErrorDetail>,

    /// Actual end state (when snapshot_on_failure=true and the test fails)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_snapshot: Option<GridSnapshot>,
}

/// Test status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// All assertions passed
    Pass,
    /// Step or state mismatches found
    Fail,
    /// Execution failed (parse error, execution exception, etc.)
    Error,
}

/// One step that settled differently than expected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepMismatch {
    /// 1-based step position
    pub step: usize,

    /// Action label for reporting
    pub action: String,

    #[serde(with = "serde_yaml::with::singleton_map")]
    pub expected: StepOutcome,

    #[serde(with = "serde_yaml::with::singleton_map")]
    pub actual: StepOutcome,
}

/// Represents a single grid comparison failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellMismatch {
    /// Type of mismatch
    pub mismatch_type: MismatchType,

    /// Expected cell values (for missing_cell, value_mismatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<HashMap<String, serde_json::Value>>,

    /// Actual cell values (for extra_cell, value_mismatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<HashMap<String, serde_json::Value>>,

    /// Fields that differ (for value_mismatch only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub differing_fields: Vec<String>,
}

/// Type of grid mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchType {
    /// Expected cell not found in the grid
    MissingCell,
    /// Grid cell not in expected output (only reported in Exact mode)
    ExtraCell,
    /// Cell found but values differ
    ValueMismatch,
}

/// Version whose final status differed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionMismatch {
    pub version: i32,

    /// None means the version was expected to be gone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<VersionStatus>,

    /// None means the version no longer exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<VersionStatus>,
}

/// Coverage figure that differed from the expectation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoverageMismatch {
    pub version: i32,
    pub expected_percentage: u8,
    pub actual_percentage: u8,
}

// ============================================================================
// Error Detail
// ============================================================================

/// Execution error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestErrorDetail {
    /// Category of error
    pub error_type: ErrorType,

    /// Human-readable error message
    pub message: String,

    /// Additional technical details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Type of error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// YAML parsing failure
    ParseError,
    /// Scenario structure invalid
    ScenarioInvalid,
    /// Board execution failure
    ExecutionError,
}

// ============================================================================
// Grid Snapshot
// ============================================================================

/// Actual end state captured for failed scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub entries: Vec<ScheduleEntry>,
    pub versions: Vec<VersionMeta>,
}

// ============================================================================
// Suite Result
// ============================================================================

/// Aggregated results from suite execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    /// Total number of scenarios executed
    pub total: usize,

    /// Number of passed scenarios
    pub passed: usize,

    /// Number of failed scenarios
    pub failed: usize,

    /// Number of errored scenarios
    pub errors: usize,

    /// Individual test results
    pub results: Vec<TestResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn create_employee(id: i64) -> Employee {
        Employee {
            id,
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            employee_group: "VZ".to_string(),
            contracted_hours: 40.0,
            is_active: true,
        }
    }

    fn create_entry(id: i64, employee_id: i64, day: u32) -> ScheduleEntry {
        ScheduleEntry {
            id,
            employee_id,
            shift_id: Some(3),
            version: 1,
            date: date(day),
            shift_start: Some(t(9)),
            shift_end: Some(t(17)),
            break_start: None,
            break_end: None,
            shift_type_id: None,
            notes: None,
        }
    }

    fn create_valid_scenario() -> PlanScenario {
        PlanScenario {
            name: "valid_plan".to_string(),
            description: Some("A valid plan scenario".to_string()),
            settings: None,
            groups: vec![],
            employees: vec![create_employee(7), create_employee(8)],
            absences: vec![],
            versions: vec![VersionMeta::draft(1)],
            active_version: Some(1),
            entries: vec![create_entry(1, 7, 11)],
            steps: vec![StepDef {
                action: StepAction::Move {
                    source_schedule_id: 1,
                    target_employee_id: 8,
                    target_date: date(12),
                    target_shift_id: None,
                    shift_start: None,
                    shift_end: None,
                },
                expect: StepOutcome::Applied,
                dispatch: DispatchScript::Succeed,
            }],
            expected: ExpectedState {
                cells: vec![ExpectedCell {
                    employee_id: 8,
                    date: date(12),
                    shift_id: Some(3),
                    shift_start: Some(t(9)),
                    shift_end: Some(t(17)),
                }],
                versions: vec![],
                coverage: None,
            },
            config: TestConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_scenario_succeeds() {
        assert!(create_valid_scenario().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_versions_fails() {
        let mut scenario = create_valid_scenario();
        scenario.versions.clear();

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("at least one version"));
    }

    #[test]
    fn test_validate_group_catalog_accepts_matching_references() {
        let mut scenario = create_valid_scenario();
        scenario.groups = vec![
            GroupDef::EmployeeType {
                id: "VZ".to_string(),
                name: "Vollzeit".to_string(),
                min_hours: 35.0,
                max_hours: 40.0,
            },
            GroupDef::AbsenceType {
                id: "vacation".to_string(),
                name: "Urlaub".to_string(),
                paid: true,
            },
        ];
        scenario.absences = vec![AbsenceRecord {
            employee_id: 7,
            start_date: date(20),
            end_date: date(21),
            absence_type_id: "vacation".to_string(),
            start_time: None,
            end_time: None,
        }];

        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_employee_group_fails_against_catalog() {
        let mut scenario = create_valid_scenario();
        scenario.groups = vec![GroupDef::EmployeeType {
            id: "TZ".to_string(),
            name: "Teilzeit".to_string(),
            min_hours: 15.0,
            max_hours: 25.0,
        }];

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("catalog does not define"));
    }

    #[test]
    fn test_validate_absence_type_must_be_in_catalog() {
        let mut scenario = create_valid_scenario();
        scenario.groups = vec![
            GroupDef::EmployeeType {
                id: "VZ".to_string(),
                name: "Vollzeit".to_string(),
                min_hours: 35.0,
                max_hours: 40.0,
            },
            GroupDef::AbsenceType {
                id: "vacation".to_string(),
                name: "Urlaub".to_string(),
                paid: true,
            },
        ];
        scenario.absences = vec![AbsenceRecord {
            employee_id: 7,
            start_date: date(20),
            end_date: date(21),
            absence_type_id: "sabbatical".to_string(),
            start_time: None,
            end_time: None,
        }];

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("sabbatical"));
    }

    #[test]
    fn test_validate_duplicate_version_numbers_fail() {
        let mut scenario = create_valid_scenario();
        scenario.versions.push(VersionMeta::draft(1));

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate version"));
    }

    #[test]
    fn test_validate_unknown_active_version_fails() {
        let mut scenario = create_valid_scenario();
        scenario.active_version = Some(9);

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("active_version"));
    }

    #[test]
    fn test_validate_entry_with_undeclared_version_fails() {
        let mut scenario = create_valid_scenario();
        scenario.entries[0].version = 2;

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("undeclared version"));
    }

    #[test]
    fn test_validate_entry_with_unknown_employee_fails() {
        let mut scenario = create_valid_scenario();
        scenario.entries[0].employee_id = 99;

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown employee"));
    }

    #[test]
    fn test_validate_duplicate_entry_ids_fail() {
        let mut scenario = create_valid_scenario();
        scenario.entries.push(create_entry(1, 8, 12));

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("duplicate schedule entry id"));
    }

    #[test]
    fn test_validate_half_specified_move_window_fails() {
        let mut scenario = create_valid_scenario();
        if let StepAction::Move { shift_start, .. } = &mut scenario.steps[0].action {
            *shift_start = Some(t(13));
        }

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("half-specified target window"));
    }

    #[test]
    fn test_validate_settle_must_point_at_a_dropped_step() {
        let mut scenario = create_valid_scenario();
        scenario.steps.push(StepDef {
            action: StepAction::Settle { step: 1 },
            expect: StepOutcome::Applied,
            dispatch: DispatchScript::Succeed,
        });

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("dispatch: drop"));

        scenario.steps[0].dispatch = DispatchScript::Drop;
        scenario.steps[0].expect = StepOutcome::Pending;
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_validate_settle_cannot_point_forward() {
        let mut scenario = create_valid_scenario();
        scenario.steps.insert(
            0,
            StepDef {
                action: StepAction::Settle { step: 1 },
                expect: StepOutcome::Applied,
                dispatch: DispatchScript::Succeed,
            },
        );

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("earlier step"));
    }

    #[test]
    fn test_validate_dispatch_script_rejected_on_version_actions() {
        let mut scenario = create_valid_scenario();
        scenario.steps.push(StepDef {
            action: StepAction::Publish { version: 1 },
            expect: StepOutcome::Applied,
            dispatch: DispatchScript::Fail,
        });

        let result = scenario.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cell mutations"));
    }

    #[test]
    fn test_scenario_parses_from_yaml() {
        let yaml = r#"
name: conflict walkthrough
versions:
  - version: 1
    status: DRAFT
employees:
  - id: 7
    first_name: Mara
    last_name: Vogel
    employee_group: TZ
    contracted_hours: 25.0
entries:
  - id: 1
    employee_id: 7
    shift_id: 3
    version: 1
    date: "2024-03-11"
    shift_start: "09:00"
    shift_end: "17:00"
steps:
  - action: clear
    schedule_id: 1
    expect: applied
  - action: move
    source_schedule_id: 1
    target_employee_id: 7
    target_date: "2024-03-12"
    expect:
      rejected: version_locked
    dispatch: fail
expected:
  cells:
    - employee_id: 7
      date: "2024-03-11"
config:
  match_mode: subset
"#;
        let scenario: PlanScenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.name, "conflict walkthrough");
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.steps[0].expect, StepOutcome::Applied);
        assert_eq!(scenario.steps[0].dispatch, DispatchScript::Succeed);
        assert_eq!(
            scenario.steps[1].expect,
            StepOutcome::Rejected(RejectKind::VersionLocked)
        );
        assert_eq!(scenario.steps[1].dispatch, DispatchScript::Fail);
        assert!(matches!(
            scenario.steps[1].action,
            StepAction::Move {
                source_schedule_id: 1,
                target_employee_id: 7,
                ..
            }
        ));
        assert_eq!(scenario.config.match_mode, MatchMode::Subset);
        assert_eq!(scenario.expected.cells[0].shift_id, None);
    }

    #[test]
    fn test_step_expectation_roundtrips_through_yaml() {
        let step = StepDef {
            action: StepAction::Clear { schedule_id: 4 },
            expect: StepOutcome::Rejected(RejectKind::SlotConflict),
            dispatch: DispatchScript::Drop,
        };

        let rendered = serde_yaml::to_string(&step).unwrap();
        let reparsed: StepDef = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(reparsed.expect, step.expect);
        assert_eq!(reparsed.dispatch, DispatchScript::Drop);
        assert_eq!(reparsed.action, step.action);
    }
}
