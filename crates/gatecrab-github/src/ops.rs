//! The GitHub operations the evaluators depend on
//!
//! Evaluators only talk to GitHub through [`PrOperations`], so the same
//! pipeline runs against the octocrab-backed client and in-memory mocks.

use crate::error::GithubResult;
use crate::types::{CheckRunList, PullRequest};
use async_trait::async_trait;
use gatecrab_core::{CombinedStatus, FileChange, PrRef};
use std::collections::HashSet;

/// Pull request operations used by the governance evaluators
#[async_trait]
pub trait PrOperations: Send + Sync {
    /// List the files changed by a PR
    ///
    /// With `early_exit_threshold` set, listing stops once at least that many
    /// files are known. Callers only need to know the diff is too large.
    async fn list_files(
        &self,
        pr: &PrRef,
        early_exit_threshold: Option<usize>,
    ) -> GithubResult<Vec<FileChange>>;

    /// Logins whose latest review currently approves the PR
    async fn get_approver_logins(&self, pr: &PrRef) -> GithubResult<HashSet<String>>;

    /// Names of the labels currently on the PR
    async fn get_labels(&self, pr: &PrRef) -> GithubResult<Vec<String>>;

    async fn add_labels(&self, pr: &PrRef, labels: &[String]) -> GithubResult<()>;

    /// Remove one label; removing an absent label succeeds
    async fn remove_label(&self, pr: &PrRef, label: &str) -> GithubResult<()>;

    async fn get_pull(&self, pr: &PrRef) -> GithubResult<PullRequest>;

    async fn get_check_runs_for_ref(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> GithubResult<CheckRunList>;

    async fn get_combined_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> GithubResult<CombinedStatus>;

    /// Open PRs, most recently updated first
    async fn list_open_pulls(&self, owner: &str, repo: &str) -> GithubResult<Vec<PullRequest>>;

    /// Decoded contents of a file on the default branch, `None` when absent
    async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> GithubResult<Option<String>>;
}
