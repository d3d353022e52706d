use anyhow::Result;
use rota_core::model::{MismatchType, RejectKind, StepOutcome, SuiteResult, TestResult, TestStatus};
use std::io::Write;
use std::path::Path;

/// Report test result in human-readable format
pub fn report_result(result: &TestResult, verbose: bool) {
    println!("Test: {}", result.scenario_name);

    match result.status {
        TestStatus::Pass => {
            println!("Status: PASS");
            println!();
            println!("✓ All steps settled as expected");
            println!("✓ Grid matches the expected cells");
            println!("✓ No version or coverage mismatches");
        }
        TestStatus::Fail => {
            println!("Status: FAIL");
            println!();

            if !result.step_mismatches.is_empty() {
                println!("Step Mismatches ({}):", result.step_mismatches.len());
                for mismatch in &result.step_mismatches {
                    println!(
                        "  ✗ Step {} ({}): expected {}, got {}",
                        mismatch.step,
                        mismatch.action,
                        describe_outcome(&mismatch.expected),
                        describe_outcome(&mismatch.actual)
                    );
                }
            }

            if !result.cell_mismatches.is_empty() {
                println!("Cell Mismatches ({}):", result.cell_mismatches.len());
                for mismatch in &result.cell_mismatches {
                    match mismatch.mismatch_type {
                        MismatchType::MissingCell => {
                            if let Some(expected) = &mismatch.expected {
                                println!("  ✗ Missing cell: {expected:?}");
                            }
                        }
                        MismatchType::ExtraCell => {
                            if let Some(actual) = &mismatch.actual {
                                println!("  ✗ Extra cell: {actual:?}");
                            }
                        }
                        MismatchType::ValueMismatch => {
                            println!("  ✗ Value mismatch");
                            if let Some(expected) = &mismatch.expected {
                                println!("      Expected: {expected:?}");
                            }
                            if let Some(actual) = &mismatch.actual {
                                println!("      Actual:   {actual:?}");
                            }
                            if !mismatch.differing_fields.is_empty() {
                                println!("      Differing fields: {:?}", mismatch.differing_fields);
                            }
                        }
                    }

                    if !verbose && result.cell_mismatches.len() > 5 {
                        println!(
                            "  ... and {} more mismatches (use --verbose to see all)",
                            result.cell_mismatches.len() - 5
                        );
                        break;
                    }
                }
            }

            if !result.version_mismatches.is_empty() {
                println!("Version Mismatches ({}):", result.version_mismatches.len());
                for mismatch in &result.version_mismatches {
                    println!(
                        "  ✗ Version {}: expected {}, got {}",
                        mismatch.version,
                        mismatch
                            .expected
                            .map(|status| format!("{status:?}"))
                            .unwrap_or_else(|| "absent".to_string()),
                        mismatch
                            .actual
                            .map(|status| format!("{status:?}"))
                            .unwrap_or_else(|| "absent".to_string())
                    );
                }
            }

            if let Some(mismatch) = &result.coverage_mismatch {
                println!(
                    "Coverage Mismatch: version {} expected {}%, got {}%",
                    mismatch.version, mismatch.expected_percentage, mismatch.actual_percentage
                );
            }
        }
        TestStatus::Error => {
            println!("Status: ERROR");
            println!();

            if let Some(error) = &result.error {
                println!("Error: {}", error.message);
                if verbose {
                    if let Some(details) = &error.details {
                        println!();
                        println!("Details:");
                        println!("{details}");
                    }
                }
            }
        }
    }

    if !result.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &result.warnings {
            println!("  ⚠ {warning}");
        }
    }
}

fn describe_outcome(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Applied => "applied".to_string(),
        StepOutcome::Pending => "pending".to_string(),
        StepOutcome::Stale => "stale".to_string(),
        StepOutcome::Rejected(kind) => format!("rejected ({})", describe_reject(kind)),
        StepOutcome::IllegalTransition => "illegal transition".to_string(),
        StepOutcome::DispatchFailed => "dispatch failed".to_string(),
    }
}

fn describe_reject(kind: &RejectKind) -> &'static str {
    match kind {
        RejectKind::VersionLocked => "version locked",
        RejectKind::AbsenceConflict => "absence conflict",
        RejectKind::SlotConflict => "slot conflict",
        RejectKind::StaleProposal => "stale proposal",
        RejectKind::UpstreamFailure => "upstream failure",
    }
}

/// Report suite results in human-readable format
pub fn report_suite_result(suite_result: &SuiteResult) {
    println!("Plan Scenario Results");
    println!("=====================");
    println!();
    println!("Total:  {}", suite_result.total);
    println!(
        "Passed: {} ({:.1}%)",
        suite_result.passed,
        percentage_of(suite_result.passed, suite_result.total)
    );
    println!(
        "Failed: {} ({:.1}%)",
        suite_result.failed,
        percentage_of(suite_result.failed, suite_result.total)
    );
    println!(
        "Errors: {} ({:.1}%)",
        suite_result.errors,
        percentage_of(suite_result.errors, suite_result.total)
    );
    println!();

    for result in &suite_result.results {
        let status_symbol = match result.status {
            TestStatus::Pass => "✓",
            TestStatus::Fail => "✗",
            TestStatus::Error => "⚠",
        };
        println!("{} {}", status_symbol, result.scenario_name);
    }
}

fn percentage_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}

/// Save the actual end state next to the scenario file
pub fn save_snapshot(result: &TestResult, scenario_path: &Path) -> Result<()> {
    if let Some(snapshot) = &result.actual_snapshot {
        let snapshots_dir = scenario_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(".snapshots");

        std::fs::create_dir_all(&snapshots_dir)?;

        let snapshot_name = sanitize_snapshot_name(&result.scenario_name);
        let snapshot_file = snapshots_dir.join(format!("{snapshot_name}-actual.yaml"));

        let yaml = serde_yaml::to_string(snapshot)?;
        std::fs::write(&snapshot_file, yaml)?;

        println!();
        println!("Snapshot saved to: {}", snapshot_file.display());
    }

    Ok(())
}

/// Output format for test results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Junit,
}

pub fn report_result_json(result: &TestResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

pub fn report_suite_result_json(suite_result: &SuiteResult) -> Result<()> {
    let json = serde_json::to_string_pretty(suite_result)?;
    println!("{json}");
    Ok(())
}

/// JUnit XML output, for CI result collection
pub fn report_suite_result_junit<W: Write>(
    suite_result: &SuiteResult,
    writer: &mut W,
) -> Result<()> {
    writeln!(writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(
        writer,
        "<testsuites tests=\"{}\" failures=\"{}\" errors=\"{}\">",
        suite_result.total, suite_result.failed, suite_result.errors
    )?;

    writeln!(
        writer,
        "  <testsuite name=\"plan-scenarios\" tests=\"{}\" failures=\"{}\" errors=\"{}\">",
        suite_result.total, suite_result.failed, suite_result.errors
    )?;

    for result in &suite_result.results {
        match result.status {
            TestStatus::Pass => {
                writeln!(
                    writer,
                    "    <testcase name=\"{}\"/>",
                    xml_escape(&result.scenario_name)
                )?;
            }
            TestStatus::Fail => {
                writeln!(
                    writer,
                    "    <testcase name=\"{}\">",
                    xml_escape(&result.scenario_name)
                )?;

                let failure_message = failure_summary(result);
                writeln!(
                    writer,
                    "      <failure message=\"{}\" type=\"TestFailure\">",
                    xml_escape(&failure_message)
                )?;
                writeln!(writer, "{}", xml_escape(&failure_message))?;
                writeln!(writer, "      </failure>")?;
                writeln!(writer, "    </testcase>")?;
            }
            TestStatus::Error => {
                writeln!(
                    writer,
                    "    <testcase name=\"{}\">",
                    xml_escape(&result.scenario_name)
                )?;

                let error_message = result
                    .error
                    .as_ref()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "Unknown error".to_string());
                let error_type = result
                    .error
                    .as_ref()
                    .map(|e| format!("{:?}", e.error_type))
                    .unwrap_or_else(|| "UnknownError".to_string());

                writeln!(
                    writer,
                    "      <error message=\"{}\" type=\"{}\">",
                    xml_escape(&error_message),
                    xml_escape(&error_type)
                )?;
                writeln!(writer, "{}", xml_escape(&error_message))?;
                writeln!(writer, "      </error>")?;
                writeln!(writer, "    </testcase>")?;
            }
        }
    }

    writeln!(writer, "  </testsuite>")?;
    writeln!(writer, "</testsuites>")?;

    Ok(())
}

fn failure_summary(result: &TestResult) -> String {
    let mut message = String::new();
    if !result.step_mismatches.is_empty() {
        message.push_str(&format!("{} step mismatches\n", result.step_mismatches.len()));
    }
    if !result.cell_mismatches.is_empty() {
        message.push_str(&format!("{} cell mismatches\n", result.cell_mismatches.len()));
    }
    if !result.version_mismatches.is_empty() {
        message.push_str(&format!(
            "{} version mismatches\n",
            result.version_mismatches.len()
        ));
    }
    if result.coverage_mismatch.is_some() {
        message.push_str("coverage mismatch\n");
    }
    message
}

/// Escape XML special characters
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn sanitize_snapshot_name(name: &str) -> String {
    let mut output = String::new();
    let mut previous_was_dash = false;

    for ch in name.chars() {
        let mapped = if ch.is_ascii_alphanumeric() {
            previous_was_dash = false;
            ch.to_ascii_lowercase()
        } else {
            if !previous_was_dash {
                output.push('-');
                previous_was_dash = true;
            }
            continue;
        };
        output.push(mapped);
    }

    let trimmed = output.trim_matches('-');
    if trimmed.is_empty() {
        "snapshot".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::model::{GridSnapshot, StepMismatch, TestResult, VersionMeta};
    use tempfile::TempDir;

    fn failing_result() -> TestResult {
        TestResult {
            scenario_name: "../escape".to_string(),
            status: TestStatus::Fail,
            warnings: vec![],
            step_mismatches: vec![],
            cell_mismatches: vec![],
            version_mismatches: vec![],
            coverage_mismatch: None,
            error: None,
            actual_snapshot: Some(GridSnapshot {
                entries: vec![],
                versions: vec![VersionMeta::draft(1)],
            }),
        }
    }

    #[test]
    fn save_snapshot_sanitizes_unsafe_scenario_name() {
        let temp = TempDir::new().unwrap();
        let scenario_path = temp.path().join("scenario.yaml");
        std::fs::write(&scenario_path, "name: test").unwrap();

        save_snapshot(&failing_result(), &scenario_path).unwrap();

        let expected_path = temp.path().join(".snapshots").join("escape-actual.yaml");
        assert!(expected_path.exists());
        assert!(!temp.path().join("..").join("escape-actual.yaml").exists());
    }

    #[test]
    fn junit_output_escapes_and_counts() {
        let mut result = failing_result();
        result.scenario_name = "needs <escaping> & quotes".to_string();
        result.step_mismatches.push(StepMismatch {
            step: 1,
            action: "move".to_string(),
            expected: StepOutcome::Applied,
            actual: StepOutcome::Rejected(RejectKind::SlotConflict),
        });
        let suite = SuiteResult {
            total: 1,
            passed: 0,
            failed: 1,
            errors: 0,
            results: vec![result],
        };

        let mut buffer = Vec::new();
        report_suite_result_junit(&suite, &mut buffer).unwrap();
        let xml = String::from_utf8(buffer).unwrap();

        assert!(xml.contains("failures=\"1\""));
        assert!(xml.contains("needs &lt;escaping&gt; &amp; quotes"));
        assert!(xml.contains("1 step mismatches"));
    }

    #[test]
    fn outcome_descriptions_are_stable() {
        assert_eq!(describe_outcome(&StepOutcome::Applied), "applied");
        assert_eq!(
            describe_outcome(&StepOutcome::Rejected(RejectKind::AbsenceConflict)),
            "rejected (absence conflict)"
        );
        assert_eq!(describe_outcome(&StepOutcome::Stale), "stale");
    }
}
