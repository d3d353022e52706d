use thiserror::Error;
use uuid::Uuid;

use crate::model::{ScheduleEntry, ScheduleUpdate, VersionMeta};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("schedule service rejected update for entry {schedule_id}: {message}")]
    Rejected { schedule_id: i64, message: String },
    #[error("schedule service unreachable: {message}")]
    Unreachable { message: String },
}

/// Persists one cell mutation. Implementations must be idempotent per
/// `(schedule_id, request_id)`: retrying a delivered update returns the
/// already-persisted entry instead of writing twice.
pub trait ScheduleDispatcher {
    fn dispatch_update(
        &self,
        schedule_id: i64,
        request_id: Uuid,
        update: &ScheduleUpdate,
    ) -> Result<ScheduleEntry, DispatchError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionControlError {
    #[error("version {version} not found")]
    VersionNotFound { version: i32 },
    #[error("version operation failed: {message}")]
    OperationFailed { message: String },
}

/// Version lifecycle side effects live behind this seam. The board only
/// rules on legality and records what the collaborator confirmed.
pub trait VersionControl {
    fn create_version(&self, base: Option<i32>) -> Result<VersionMeta, VersionControlError>;

    fn publish_version(&self, version: i32) -> Result<VersionMeta, VersionControlError>;

    fn archive_version(&self, version: i32) -> Result<VersionMeta, VersionControlError>;

    /// Removes the version and every schedule entry belonging to it.
    fn delete_version(&self, version: i32) -> Result<(), VersionControlError>;

    /// Copies the version's entries into a fresh draft and returns its
    /// metadata.
    fn duplicate_version(&self, version: i32) -> Result<VersionMeta, VersionControlError>;
}
