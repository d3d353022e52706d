mod common;

use common::*;
use rota_core::engine::BoardError;
use rota_core::model::VersionStatus;
use rota_core::reassign::{MoveRequest, RejectReason};

fn move_request(source: i64, employee_id: i64, day: u32) -> MoveRequest {
    MoveRequest {
        source_schedule_id: source,
        target_employee_id: employee_id,
        target_date: date(day),
        target_shift_id: None,
        target_window: None,
    }
}

#[test]
fn publish_freezes_the_grid_until_archive() {
    let mut board = draft_board(vec![entry(1, 7, 11, 1)]);

    board.apply_transition(1, VersionStatus::Published).unwrap();

    let error = board.propose_move(&move_request(1, 9, 13), &[]).unwrap_err();
    assert!(matches!(
        error,
        BoardError::Rejected(RejectReason::VersionLocked { .. })
    ));

    let actions = board.version_actions(1).unwrap();
    assert!(!actions.can_publish);
    assert!(actions.can_archive);

    board.apply_transition(1, VersionStatus::Archived).unwrap();
    let error = board
        .apply_transition(1, VersionStatus::Archived)
        .unwrap_err();
    assert!(matches!(error, BoardError::Lifecycle(_)));
}

#[test]
fn duplicate_opens_an_editable_copy_of_a_published_plan() {
    let mut board = draft_board(vec![entry(1, 7, 11, 1), entry(2, 8, 12, 1)]);
    board.apply_transition(1, VersionStatus::Published).unwrap();

    let copy = board.duplicate_version(1).unwrap();
    assert_eq!(copy.version, 2);
    assert_eq!(copy.base_version, Some(1));
    assert_eq!(copy.status, VersionStatus::Draft);

    // the copies arrive from the version service with fresh ids
    board
        .ingest_entries(vec![entry(10, 7, 11, 2), entry(11, 8, 12, 2)])
        .unwrap();
    board.set_active_version(2).unwrap();

    let pending = board.propose_move(&move_request(10, 9, 13), &[]).unwrap();
    let response = persisted(10, 2, &pending.update);
    board.confirm_proposal(pending.proposal_id, response).unwrap();

    assert_eq!(board.index().cell(9, date(13)).map(|e| e.id), Some(10));
    // the published original is untouched by edits to the copy
    assert_eq!(
        board.entries().iter().filter(|e| e.version == 1).count(),
        2
    );
}

#[test]
fn deleting_the_working_copy_returns_to_the_original() {
    let mut board = draft_board(vec![entry(1, 7, 11, 1)]);

    board.duplicate_version(1).unwrap();
    board.ingest_entries(vec![entry(10, 7, 11, 2)]).unwrap();
    board.set_active_version(2).unwrap();

    let removed = board.delete_version(2).unwrap();
    assert_eq!(removed, 1);

    assert_eq!(board.active_version(), 1);
    assert_eq!(board.index().cell(7, date(11)).map(|e| e.id), Some(1));
    assert!(board.version(2).is_none());
}

#[test]
fn coverage_tracks_the_flow_from_vacant_to_filled() {
    let mut board = draft_board(vec![entry(1, 7, 11, 1), empty_cell(2, 8, 11, 1)]);

    let stats = board.coverage(1).unwrap();
    assert_eq!(stats.total_shifts, 2);
    assert_eq!(stats.filled_shifts, 1);
    assert_eq!(stats.percentage, 50);

    // moving the assignment onto the vacant cell fills it
    let pending = board.propose_move(&move_request(1, 8, 11), &[]).unwrap();
    let response = persisted(1, 1, &pending.update);
    board.confirm_proposal(pending.proposal_id, response).unwrap();

    let stats = board.coverage(1).unwrap();
    assert_eq!(stats.filled_shifts, 1);
    assert_eq!(stats.percentage, 100);
}
