use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("schedule entry {id} appears twice in seed data")]
    DuplicateEntry { id: i64 },
    #[error("version {version} appears twice in seed data")]
    DuplicateVersion { version: i32 },
    #[error("schedule entry {id} references version {version}, which was not seeded")]
    UnseededVersion { id: i64, version: i32 },
    #[error("failed to lock store state: {message}")]
    LockPoisoned { message: String },
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to lock store state: {message}")]
    LockPoisoned { message: String },
}
