use serde::{Deserialize, Serialize};

/// Execution state of a check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

/// Final conclusion of a completed check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

impl CheckConclusion {
    /// Conclusions that do not block a merge
    pub fn is_passing(self) -> bool {
        matches!(self, Self::Success | Self::Neutral | Self::Skipped)
    }
}

/// One CI check run reported against a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    pub name: String,
    pub status: CheckStatus,
    pub conclusion: Option<CheckConclusion>,
}

impl CheckRun {
    pub fn is_passing(&self) -> bool {
        self.status == CheckStatus::Completed && self.conclusion.is_some_and(CheckConclusion::is_passing)
    }
}

/// Legacy combined commit status state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Success,
    Pending,
    Failure,
    Error,
}

/// Legacy combined commit status for a ref
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedStatus {
    pub state: StatusState,
    pub total_count: u64,
}

impl CombinedStatus {
    /// True when the status API reports a failing aggregate
    ///
    /// GitHub reports `pending` with zero contexts when no statuses exist,
    /// so only populated statuses are considered.
    pub fn is_failing(&self) -> bool {
        self.total_count > 0 && matches!(self.state, StatusState::Failure | StatusState::Error)
    }
}

/// Combine check runs and the combined status into one verdict
///
/// No check runs and no statuses at all counts as passing.
pub fn ci_passing(check_runs: &[CheckRun], combined: Option<&CombinedStatus>) -> bool {
    if !check_runs.iter().all(CheckRun::is_passing) {
        return false;
    }

    !combined.is_some_and(CombinedStatus::is_failing)
}

/// Reason string used when CI is not green
pub fn checks_failed_reason(sha: &str) -> String {
    let short = sha.get(..7).unwrap_or(sha);
    format!("checks not passing for {}", short)
}
