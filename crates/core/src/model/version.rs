use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionMeta {
    pub version: i32,
    pub status: VersionStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Version this one was duplicated from, when it was not started blank.
    #[serde(default)]
    pub base_version: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl VersionMeta {
    pub fn draft(version: i32) -> Self {
        Self {
            version,
            status: VersionStatus::Draft,
            created_at: None,
            updated_at: None,
            base_version: None,
            notes: None,
        }
    }
}
