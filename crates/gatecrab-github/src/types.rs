use chrono::{DateTime, Utc};
use gatecrab_core::{CheckRun, PrRef};
use serde::{Deserialize, Serialize};

/// GitHub user information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub id: i64,
}

/// GitHub repository information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: User,
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl Repository {
    /// Build a PR reference inside this repository
    pub fn pr(&self, number: u64) -> PrRef {
        PrRef::new(self.owner.login.clone(), self.name.clone(), number)
    }
}

/// Commit pointer on a PR (head or base)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    #[serde(rename = "ref", default)]
    pub git_ref: String,
}

/// Label attached to an issue or PR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Pull request information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub draft: bool,
    pub head: CommitRef,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl PullRequest {
    pub fn new(number: u64, head_sha: impl Into<String>) -> Self {
        Self {
            number,
            title: String::new(),
            state: "open".to_string(),
            draft: false,
            head: CommitRef {
                sha: head_sha.into(),
                git_ref: String::new(),
            },
            labels: Vec::new(),
            html_url: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == "open"
    }

    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }
}

/// Pull request review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    /// Absent for deleted accounts
    pub user: Option<User>,
    pub state: String,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Pull request webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub number: u64,
    pub pull_request: PullRequest,
    pub repository: Repository,
}

/// Pull request review webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestReviewEvent {
    pub action: String,
    pub review: Review,
    pub pull_request: PullRequest,
    pub repository: Repository,
}

/// PR pointer carried by check payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckPullRequest {
    pub number: u64,
    /// Head of the PR when the check was reported
    #[serde(default)]
    pub head: Option<CommitRef>,
}

impl CheckPullRequest {
    pub fn head_sha(&self) -> Option<&str> {
        self.head.as_ref().map(|head| head.sha.as_str())
    }
}

/// Check payload shared by `check_run` and `check_suite` events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckTarget {
    pub head_sha: String,
    #[serde(default)]
    pub pull_requests: Vec<CheckPullRequest>,
}

/// `check_run` webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRunEvent {
    pub action: String,
    pub check_run: CheckTarget,
    pub repository: Repository,
}

/// `check_suite` webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSuiteEvent {
    pub action: String,
    pub check_suite: CheckTarget,
    pub repository: Repository,
}

/// `status` webhook event (legacy commit status)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub sha: String,
    pub state: String,
    #[serde(default)]
    pub context: Option<String>,
    pub repository: Repository,
}

/// Files touched by one pushed commit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushCommit {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

/// `push` webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub commits: Vec<PushCommit>,
    pub repository: Repository,
}

impl PushEvent {
    /// Whether the push landed on the repository's default branch
    pub fn is_default_branch(&self) -> bool {
        self.repository
            .default_branch
            .as_deref()
            .is_some_and(|branch| self.git_ref.strip_prefix("refs/heads/") == Some(branch))
    }

    /// Whether any pushed commit added, modified or removed `path`
    pub fn touches(&self, path: &str) -> bool {
        self.commits.iter().any(|commit| {
            commit
                .added
                .iter()
                .chain(&commit.modified)
                .chain(&commit.removed)
                .any(|p| p == path)
        })
    }
}

/// Response of `GET /repos/{owner}/{repo}/commits/{ref}/check-runs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRunList {
    pub total_count: u64,
    #[serde(default)]
    pub check_runs: Vec<CheckRun>,
}

impl CheckRunList {
    /// Whether every run GitHub reported was actually fetched
    pub fn is_complete(&self) -> bool {
        self.check_runs.len() as u64 >= self.total_count
    }
}
