use serde::{Deserialize, Serialize};

use crate::labels::{AUTOMERGE_LABEL, MERGE_READY_LABEL};

/// Automerge policy block
///
/// Controls when the automerge label is applied. All limits are inclusive:
/// a PR with exactly `max_files` files passes the file-count check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomergePolicy {
    /// Evaluate and log, but never touch labels
    pub dry_run: bool,

    /// Glob patterns a changed path must match (at least one)
    pub allowed_paths: Vec<String>,

    /// Glob patterns that reject a changed path outright
    pub deny_paths: Vec<String>,

    /// Maximum number of changed files
    pub max_files: usize,

    /// Maximum additions + deletions across all files
    pub max_changed_lines: u64,

    /// Minimum number of trusted approvals
    pub min_approvals: usize,

    /// Whether CI must be green on the head commit
    pub require_checks: bool,
}

impl Default for AutomergePolicy {
    fn default() -> Self {
        Self {
            dry_run: false,
            allowed_paths: Vec::new(),
            deny_paths: Vec::new(),
            max_files: 20,
            max_changed_lines: 500,
            min_approvals: 1,
            require_checks: true,
        }
    }
}

/// Merge-readiness policy block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessPolicy {
    /// Minimum number of trusted approvals
    pub required_approvals: usize,

    /// Logins counted toward `required_approvals`; empty falls back to the
    /// repository-wide list
    pub trusted_reviewers: Vec<String>,

    /// Whether CI must be green on the head commit
    pub require_checks: bool,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            required_approvals: 1,
            trusted_reviewers: Vec::new(),
            require_checks: true,
        }
    }
}

impl ReadinessPolicy {
    /// Trusted reviewers for this block, or `fallback` when none are configured
    pub fn reviewers<'a>(&'a self, fallback: &'a [String]) -> &'a [String] {
        if self.trusted_reviewers.is_empty() {
            fallback
        } else {
            &self.trusted_reviewers
        }
    }
}

/// Label names applied by the evaluators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelNames {
    pub automerge: String,
    pub merge_ready: String,
}

impl Default for LabelNames {
    fn default() -> Self {
        Self {
            automerge: AUTOMERGE_LABEL.to_string(),
            merge_ready: MERGE_READY_LABEL.to_string(),
        }
    }
}

/// Per-repository governance policy
///
/// A missing block means the corresponding feature is disabled. The default
/// value disables everything, which is what a repository without a policy
/// file gets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoPolicy {
    pub automerge: Option<AutomergePolicy>,
    pub merge_readiness: Option<ReadinessPolicy>,
    pub trusted_reviewers: Vec<String>,
    pub labels: LabelNames,
}

impl RepoPolicy {
    /// True when no evaluator is enabled
    pub fn is_disabled(&self) -> bool {
        self.automerge.is_none() && self.merge_readiness.is_none()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}
