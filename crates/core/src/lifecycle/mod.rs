//! Plan version lifecycle.
//!
//! Versions move one way through draft, published, archived. Legality
//! lives in a single transition table so queries and mutations cannot
//! drift apart.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::model::{VersionMeta, VersionStatus};

/// Every legal transition. Anything not listed is rejected.
pub const LEGAL_TRANSITIONS: [(VersionStatus, VersionStatus); 3] = [
    (VersionStatus::Draft, VersionStatus::Published),
    (VersionStatus::Draft, VersionStatus::Archived),
    (VersionStatus::Published, VersionStatus::Archived),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("version {version} cannot go from {from:?} to {to:?}")]
    IllegalTransition {
        version: i32,
        from: VersionStatus,
        to: VersionStatus,
    },
    #[error("version {version} notes are frozen while {status:?}")]
    NotesLocked { version: i32, status: VersionStatus },
}

pub fn can_transition(from: VersionStatus, to: VersionStatus) -> bool {
    LEGAL_TRANSITIONS
        .iter()
        .any(|(source, target)| *source == from && *target == to)
}

pub fn can_publish(status: VersionStatus) -> bool {
    can_transition(status, VersionStatus::Published)
}

pub fn can_archive(status: VersionStatus) -> bool {
    can_transition(status, VersionStatus::Archived)
}

/// What the rendering layer may offer for a version in this status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionActions {
    pub can_publish: bool,
    pub can_archive: bool,
}

pub fn version_actions(status: VersionStatus) -> VersionActions {
    VersionActions {
        can_publish: can_publish(status),
        can_archive: can_archive(status),
    }
}

pub fn transition(meta: &mut VersionMeta, target: VersionStatus) -> Result<(), LifecycleError> {
    if !can_transition(meta.status, target) {
        return Err(LifecycleError::IllegalTransition {
            version: meta.version,
            from: meta.status,
            to: target,
        });
    }

    debug!(version = meta.version, from = ?meta.status, to = ?target, "version transition");
    meta.status = target;
    Ok(())
}

/// Next free version number, one past the highest still in use.
/// Numbering starts at 1; gaps left by deleted versions stay gaps.
pub fn next_version<I: IntoIterator<Item = i32>>(existing: I) -> i32 {
    existing.into_iter().max().map(|max| max + 1).unwrap_or(1)
}

/// A fresh draft copied from `source`. Duplication is legal from any
/// source status; only the copy is editable.
pub fn duplicate_of(source: &VersionMeta, new_number: i32) -> VersionMeta {
    VersionMeta {
        version: new_number,
        status: VersionStatus::Draft,
        created_at: None,
        updated_at: None,
        base_version: Some(source.version),
        notes: source.notes.clone(),
    }
}

/// Notes stay editable only while the version is a draft.
pub fn update_notes(meta: &mut VersionMeta, notes: Option<String>) -> Result<(), LifecycleError> {
    if meta.status != VersionStatus::Draft {
        return Err(LifecycleError::NotesLocked {
            version: meta.version,
            status: meta.status,
        });
    }
    meta.notes = notes;
    Ok(())
}
