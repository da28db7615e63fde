#![allow(dead_code)]

pub mod mock_ops;

use gatecrab_core::{AutomergePolicy, ReadinessPolicy, RepoPolicy};

pub const OWNER: &str = "octo";
pub const REPO: &str = "repo";

/// Policy with both evaluators on, trusting alice and bob
pub fn governed_policy() -> RepoPolicy {
    RepoPolicy {
        automerge: Some(AutomergePolicy {
            allowed_paths: vec!["*.md".to_string(), "docs/**".to_string()],
            deny_paths: vec![".github/**".to_string()],
            max_files: 5,
            max_changed_lines: 100,
            min_approvals: 2,
            ..Default::default()
        }),
        merge_readiness: Some(ReadinessPolicy {
            required_approvals: 2,
            ..Default::default()
        }),
        trusted_reviewers: vec!["alice".to_string(), "bob".to_string()],
        ..Default::default()
    }
}
