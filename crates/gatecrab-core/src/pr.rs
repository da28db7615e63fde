use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one pull request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PrRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for PrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.full_name(), self.number)
    }
}

/// Change status of a file in a PR diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

/// One file of a PR diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub additions: u64,
    pub deletions: u64,
    pub status: FileStatus,
    /// Only set for renames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}

impl FileChange {
    pub fn new(filename: impl Into<String>, additions: u64, deletions: u64) -> Self {
        Self {
            filename: filename.into(),
            additions,
            deletions,
            status: FileStatus::Modified,
            previous_filename: None,
        }
    }

    pub fn renamed(
        previous: impl Into<String>,
        filename: impl Into<String>,
        additions: u64,
        deletions: u64,
    ) -> Self {
        Self {
            filename: filename.into(),
            additions,
            deletions,
            status: FileStatus::Renamed,
            previous_filename: Some(previous.into()),
        }
    }

    pub fn changed_lines(&self) -> u64 {
        self.additions + self.deletions
    }
}
