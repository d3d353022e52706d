use rota_core::model::{
    CellMismatch, CoverageExpectation, CoverageMismatch, ExpectedCell, MatchMode, MismatchType,
    ScheduleEntry, VersionMeta, VersionMismatch,
};
use rota_core::model::ExpectedVersion;
use rota_core::coverage::VersionCoverage;
use std::collections::HashMap;

type CellValues = HashMap<String, serde_json::Value>;

/// Compare the final grid against the expected cells.
///
/// Cells are matched by (employee_id, date); order never matters. In
/// exact mode every grid cell must be listed, in subset mode extra
/// cells are tolerated.
pub fn compare_cells(
    actual: &[ScheduleEntry],
    expected: &[ExpectedCell],
    mode: MatchMode,
) -> Vec<CellMismatch> {
    let mut mismatches = Vec::new();

    let actual_by_key: HashMap<(i64, chrono::NaiveDate), &ScheduleEntry> = actual
        .iter()
        .map(|entry| ((entry.employee_id, entry.date), entry))
        .collect();

    for cell in expected {
        match actual_by_key.get(&(cell.employee_id, cell.date)) {
            None => mismatches.push(CellMismatch {
                mismatch_type: MismatchType::MissingCell,
                expected: Some(expected_values(cell)),
                actual: None,
                differing_fields: vec![],
            }),
            Some(entry) => {
                let differing = differing_fields(entry, cell);
                if !differing.is_empty() {
                    mismatches.push(CellMismatch {
                        mismatch_type: MismatchType::ValueMismatch,
                        expected: Some(expected_values(cell)),
                        actual: Some(entry_values(entry)),
                        differing_fields: differing,
                    });
                }
            }
        }
    }

    if mode == MatchMode::Exact {
        for entry in actual {
            let listed = expected
                .iter()
                .any(|cell| cell.employee_id == entry.employee_id && cell.date == entry.date);
            if !listed {
                mismatches.push(CellMismatch {
                    mismatch_type: MismatchType::ExtraCell,
                    expected: None,
                    actual: Some(entry_values(entry)),
                    differing_fields: vec![],
                });
            }
        }
    }

    mismatches
}

/// An expected cell with no times asserts the grid cell has none, so
/// every field is compared, not just the present ones.
fn differing_fields(entry: &ScheduleEntry, cell: &ExpectedCell) -> Vec<String> {
    let mut fields = Vec::new();
    if entry.shift_id != cell.shift_id {
        fields.push("shift_id".to_string());
    }
    if entry.shift_start != cell.shift_start {
        fields.push("shift_start".to_string());
    }
    if entry.shift_end != cell.shift_end {
        fields.push("shift_end".to_string());
    }
    fields
}

/// Compare the version table against an exhaustive expectation: a
/// version missing from the list is asserted to be gone.
pub fn compare_versions(
    actual: &[VersionMeta],
    expected: &[ExpectedVersion],
) -> Vec<VersionMismatch> {
    let mut mismatches = Vec::new();

    for expectation in expected {
        match actual
            .iter()
            .find(|meta| meta.version == expectation.version)
        {
            None => mismatches.push(VersionMismatch {
                version: expectation.version,
                expected: Some(expectation.status),
                actual: None,
            }),
            Some(meta) if meta.status != expectation.status => {
                mismatches.push(VersionMismatch {
                    version: expectation.version,
                    expected: Some(expectation.status),
                    actual: Some(meta.status),
                });
            }
            Some(_) => {}
        }
    }

    for meta in actual {
        if !expected.iter().any(|e| e.version == meta.version) {
            mismatches.push(VersionMismatch {
                version: meta.version,
                expected: None,
                actual: Some(meta.status),
            });
        }
    }

    mismatches
}

pub fn compare_coverage(
    actual: &VersionCoverage,
    expectation: &CoverageExpectation,
) -> Option<CoverageMismatch> {
    if actual.percentage == expectation.percentage {
        return None;
    }
    Some(CoverageMismatch {
        version: expectation.version,
        expected_percentage: expectation.percentage,
        actual_percentage: actual.percentage,
    })
}

fn entry_values(entry: &ScheduleEntry) -> CellValues {
    cell_values(
        entry.employee_id,
        entry.date,
        entry.shift_id,
        entry.shift_start,
        entry.shift_end,
    )
}

fn expected_values(cell: &ExpectedCell) -> CellValues {
    cell_values(
        cell.employee_id,
        cell.date,
        cell.shift_id,
        cell.shift_start,
        cell.shift_end,
    )
}

fn cell_values(
    employee_id: i64,
    date: chrono::NaiveDate,
    shift_id: Option<i64>,
    shift_start: Option<chrono::NaiveTime>,
    shift_end: Option<chrono::NaiveTime>,
) -> CellValues {
    let mut values = CellValues::new();
    values.insert("employee_id".to_string(), serde_json::json!(employee_id));
    values.insert(
        "date".to_string(),
        serde_json::json!(date.format("%Y-%m-%d").to_string()),
    );
    values.insert("shift_id".to_string(), serde_json::json!(shift_id));
    values.insert(
        "shift_start".to_string(),
        serde_json::json!(shift_start.map(|t| t.format("%H:%M").to_string())),
    );
    values.insert(
        "shift_end".to_string(),
        serde_json::json!(shift_end.map(|t| t.format("%H:%M").to_string())),
    );
    values
}
