use anyhow::{bail, Context, Result};
use rota_core::engine::{BoardError, ConfirmOutcome, PlanBoard, ScheduleDispatcher, VersionControl};
use rota_core::model::{
    DispatchScript, ErrorType, GridSnapshot, PlanScenario, ScheduleEntry, StepAction, StepOutcome,
    StepMismatch, SuiteResult, TestErrorDetail, TestResult, TestStatus, VersionStatus,
};
use rota_core::reassign::{EditRequest, MoveRequest};
use rota_core::shift::{SlotClassifier, TimeWindow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use test_store::InMemoryPlanService;
use walkdir::WalkDir;

use super::comparator::{compare_cells, compare_coverage, compare_versions};

/// A dispatch response withheld by a `dispatch: drop` step, waiting for
/// a settle step to deliver it.
struct WithheldResponse {
    proposal_id: u64,
    persisted: ScheduleEntry,
}

/// Execute a single plan scenario against a fresh board and in-memory
/// service. Interaction rejects and mismatches land in the result;
/// anything returned as `Err` is an execution failure.
pub fn execute_scenario(scenario: &PlanScenario) -> Result<TestResult> {
    let service = InMemoryPlanService::from_scenario(scenario)
        .context("failed to seed the plan service")?;

    let classifier = scenario
        .settings
        .as_ref()
        .map(|settings| SlotClassifier::new(&settings.shift_types))
        .unwrap_or_default();

    let mut board = PlanBoard::new(classifier);
    board.load_versions(service.versions()?);
    board.load_entries(service.all_entries()?)?;

    let active = scenario
        .active_version
        .or_else(|| scenario.versions.iter().map(|meta| meta.version).min());
    if let Some(version) = active {
        board.set_active_version(version)?;
    }

    let mut result = TestResult {
        scenario_name: scenario.name.clone(),
        status: TestStatus::Pass,
        warnings: Vec::new(),
        step_mismatches: Vec::new(),
        cell_mismatches: Vec::new(),
        version_mismatches: Vec::new(),
        coverage_mismatch: None,
        error: None,
        actual_snapshot: None,
    };

    if let Some(settings) = &scenario.settings {
        for entry in &scenario.entries {
            if !settings.is_opening_day(entry.date) {
                result.warnings.push(format!(
                    "entry {} is scheduled on {}, which is not an opening day",
                    entry.id, entry.date
                ));
            }
            if let (Some(start), Some(end)) = (entry.shift_start, entry.shift_end) {
                if !settings.within_opening_hours(start, end) {
                    result.warnings.push(format!(
                        "entry {} runs {start}-{end}, outside the store's opening hours",
                        entry.id
                    ));
                }
            }
        }
    }

    let mut withheld: HashMap<usize, WithheldResponse> = HashMap::new();

    for (position, step) in scenario.steps.iter().enumerate() {
        let step_number = position + 1;
        let actual = run_step(&mut board, &service, scenario, step, step_number, &mut withheld)
            .with_context(|| format!("step {step_number} ({})", step.action.label()))?;

        if actual != step.expect {
            result.step_mismatches.push(StepMismatch {
                step: step_number,
                action: step.action.label().to_string(),
                expected: step.expect,
                actual,
            });
        }
    }

    for (position, response) in withheld {
        result.warnings.push(format!(
            "step {position} dispatch response for proposal {} was never settled",
            response.proposal_id
        ));
    }

    let actual_cells = board.index().flatten();
    result.cell_mismatches = compare_cells(
        &actual_cells,
        &scenario.expected.cells,
        scenario.config.match_mode,
    );

    if !scenario.expected.versions.is_empty() {
        let actual_versions: Vec<_> = board.versions().cloned().collect();
        result.version_mismatches =
            compare_versions(&actual_versions, &scenario.expected.versions);
    }

    if let Some(expectation) = &scenario.expected.coverage {
        match board.coverage(expectation.version) {
            Ok(stats) => result.coverage_mismatch = compare_coverage(&stats, expectation),
            Err(BoardError::UnknownVersion { version }) => {
                result.warnings.push(format!(
                    "coverage expectation references version {version}, which no longer exists"
                ));
                result.coverage_mismatch = Some(rota_core::model::CoverageMismatch {
                    version: expectation.version,
                    expected_percentage: expectation.percentage,
                    actual_percentage: 0,
                });
            }
            Err(other) => return Err(other.into()),
        }
    }

    let failed = !result.step_mismatches.is_empty()
        || !result.cell_mismatches.is_empty()
        || !result.version_mismatches.is_empty()
        || result.coverage_mismatch.is_some();

    if failed {
        result.status = TestStatus::Fail;
        if scenario.config.snapshot_on_failure {
            result.actual_snapshot = Some(GridSnapshot {
                entries: actual_cells,
                versions: board.versions().cloned().collect(),
            });
        }
    }

    Ok(result)
}

fn run_step(
    board: &mut PlanBoard,
    service: &InMemoryPlanService,
    scenario: &PlanScenario,
    step: &rota_core::model::StepDef,
    step_number: usize,
    withheld: &mut HashMap<usize, WithheldResponse>,
) -> Result<StepOutcome> {
    match &step.action {
        StepAction::Move {
            source_schedule_id,
            target_employee_id,
            target_date,
            target_shift_id,
            shift_start,
            shift_end,
        } => {
            let request = MoveRequest {
                source_schedule_id: *source_schedule_id,
                target_employee_id: *target_employee_id,
                target_date: *target_date,
                target_shift_id: *target_shift_id,
                target_window: match (shift_start, shift_end) {
                    (Some(start), Some(end)) => Some(TimeWindow::new(*start, *end)),
                    _ => None,
                },
            };
            let proposed = board.propose_move(&request, &scenario.absences);
            settle_mutation(board, service, proposed, step, step_number, withheld)
        }
        StepAction::Clear { schedule_id } => {
            let proposed = board.propose_clear(*schedule_id);
            settle_mutation(board, service, proposed, step, step_number, withheld)
        }
        StepAction::Edit {
            schedule_id,
            shift_start,
            shift_end,
            break_start,
            break_end,
            notes,
        } => {
            let request = EditRequest {
                schedule_id: *schedule_id,
                shift_start: *shift_start,
                shift_end: *shift_end,
                break_start: *break_start,
                break_end: *break_end,
                notes: notes.clone(),
            };
            let proposed = board.propose_edit(&request);
            settle_mutation(board, service, proposed, step, step_number, withheld)
        }
        StepAction::Publish { version } => {
            transition_step(board, *version, VersionStatus::Published, || {
                service.publish_version(*version).map(|_| ())
            })
        }
        StepAction::Archive { version } => {
            transition_step(board, *version, VersionStatus::Archived, || {
                service.archive_version(*version).map(|_| ())
            })
        }
        StepAction::DeleteVersion { version } => {
            board.delete_version(*version)?;
            VersionControl::delete_version(service, *version)?;
            Ok(StepOutcome::Applied)
        }
        StepAction::DuplicateVersion { version } => {
            let copy = service.duplicate_version(*version)?;
            board.record_version(copy.clone());
            board.ingest_entries(service.entries_for_version(copy.version)?)?;
            Ok(StepOutcome::Applied)
        }
        StepAction::UpdateNotes { version, notes } => {
            match board.update_notes(*version, notes.clone()) {
                Ok(()) => Ok(StepOutcome::Applied),
                Err(BoardError::Lifecycle(_)) => Ok(StepOutcome::IllegalTransition),
                Err(other) => Err(other.into()),
            }
        }
        StepAction::Settle { step: dropped } => {
            let Some(response) = withheld.remove(dropped) else {
                bail!("step {dropped} has no withheld dispatch response");
            };
            match board.confirm_proposal(response.proposal_id, response.persisted)? {
                ConfirmOutcome::Applied(_) => Ok(StepOutcome::Applied),
                ConfirmOutcome::Stale { .. } => Ok(StepOutcome::Stale),
            }
        }
    }
}

/// Drives a proposed cell mutation through its scripted dispatch.
fn settle_mutation(
    board: &mut PlanBoard,
    service: &InMemoryPlanService,
    proposed: std::result::Result<rota_core::engine::PendingProposal, BoardError>,
    step: &rota_core::model::StepDef,
    step_number: usize,
    withheld: &mut HashMap<usize, WithheldResponse>,
) -> Result<StepOutcome> {
    let pending = match proposed {
        Ok(pending) => pending,
        Err(BoardError::Rejected(reason)) => {
            return Ok(StepOutcome::Rejected((&reason).into()));
        }
        Err(other) => return Err(other.into()),
    };

    match step.dispatch {
        DispatchScript::Succeed => {
            let persisted =
                service.dispatch_update(pending.schedule_id, pending.request_id, &pending.update)?;
            match board.confirm_proposal(pending.proposal_id, persisted)? {
                ConfirmOutcome::Applied(_) => Ok(StepOutcome::Applied),
                ConfirmOutcome::Stale { .. } => Ok(StepOutcome::Stale),
            }
        }
        DispatchScript::Fail => {
            service.fail_next_dispatch("scripted dispatch failure")?;
            let error = match service.dispatch_update(
                pending.schedule_id,
                pending.request_id,
                &pending.update,
            ) {
                Err(error) => error,
                Ok(_) => bail!("scripted dispatch failure did not trigger"),
            };
            board.fail_proposal(pending.proposal_id, error.to_string())?;
            Ok(StepOutcome::DispatchFailed)
        }
        DispatchScript::Drop => {
            // the service persists, but the response is held back
            let persisted =
                service.dispatch_update(pending.schedule_id, pending.request_id, &pending.update)?;
            withheld.insert(
                step_number,
                WithheldResponse {
                    proposal_id: pending.proposal_id,
                    persisted,
                },
            );
            Ok(StepOutcome::Pending)
        }
    }
}

fn transition_step(
    board: &mut PlanBoard,
    version: i32,
    target: VersionStatus,
    mirror: impl FnOnce() -> std::result::Result<(), rota_core::engine::VersionControlError>,
) -> Result<StepOutcome> {
    match board.apply_transition(version, target) {
        Ok(()) => {
            mirror()?;
            Ok(StepOutcome::Applied)
        }
        Err(BoardError::Lifecycle(_)) => Ok(StepOutcome::IllegalTransition),
        Err(other) => Err(other.into()),
    }
}

/// Discover plan scenarios in a directory
pub fn discover_scenarios(suite_path: &Path) -> Result<Vec<PathBuf>> {
    let mut scenarios = Vec::new();

    for entry in WalkDir::new(suite_path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext == "yaml" || ext == "yml" {
                // Skip hidden files and underscore-prefixed files
                if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
                    if !file_name.starts_with('.') && !file_name.starts_with('_') {
                        scenarios.push(path.to_path_buf());
                    }
                }
            }
        }
    }

    scenarios.sort();
    Ok(scenarios)
}

/// Execute a suite of scenario files
pub fn execute_suite(scenarios: &[PathBuf]) -> Result<SuiteResult> {
    use super::parser::parse_scenario;

    let mut results = Vec::new();
    let mut passed = 0;
    let mut failed = 0;
    let mut errors = 0;

    for scenario_path in scenarios {
        match parse_scenario(scenario_path) {
            Ok(scenario) => match execute_scenario(&scenario) {
                Ok(result) => {
                    match result.status {
                        TestStatus::Pass => passed += 1,
                        TestStatus::Fail => failed += 1,
                        TestStatus::Error => errors += 1,
                    }
                    results.push(result);
                }
                Err(error) => {
                    errors += 1;
                    results.push(error_result(
                        scenario.name.clone(),
                        ErrorType::ExecutionError,
                        &error,
                    ));
                }
            },
            Err(error) => {
                errors += 1;
                results.push(error_result(
                    scenario_path.display().to_string(),
                    ErrorType::ParseError,
                    &error,
                ));
            }
        }
    }

    Ok(SuiteResult {
        total: scenarios.len(),
        passed,
        failed,
        errors,
        results,
    })
}

fn error_result(scenario_name: String, error_type: ErrorType, error: &anyhow::Error) -> TestResult {
    TestResult {
        scenario_name,
        status: TestStatus::Error,
        warnings: Vec::new(),
        step_mismatches: Vec::new(),
        cell_mismatches: Vec::new(),
        version_mismatches: Vec::new(),
        coverage_mismatch: None,
        error: Some(TestErrorDetail {
            error_type,
            message: error.to_string(),
            details: Some(format!("{error:?}")),
        }),
        actual_snapshot: None,
    }
}
