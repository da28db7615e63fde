//! In-memory GitHub for evaluator tests
//!
//! Implements `PrOperations` by hand with call tracking and error injection.
//! Labels added or removed through the trait are reflected in later reads,
//! so repeated evaluations observe their own side effects.

#![allow(dead_code)]

use async_trait::async_trait;
use gatecrab_core::{
    CheckConclusion, CheckRun, CheckStatus, CombinedStatus, FileChange, PrRef, StatusState,
};
use gatecrab_github::{CheckRunList, GithubError, GithubResult, Label, PrOperations, PullRequest};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// One recorded trait call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListFiles(u64, Option<usize>),
    GetApprovers(u64),
    GetLabels(u64),
    AddLabels(u64, Vec<String>),
    RemoveLabel(u64, String),
    GetPull(u64),
    GetCheckRuns(String),
    GetCombinedStatus(String),
    ListOpenPulls,
    GetFileContent(String),
}

#[derive(Default)]
struct MockPr {
    head_sha: String,
    files: Vec<FileChange>,
    approvers: HashSet<String>,
    labels: Vec<String>,
}

/// Hand-written `PrOperations` mock
#[derive(Default)]
pub struct MockPrOperations {
    prs: Mutex<HashMap<u64, MockPr>>,
    open_order: Mutex<Vec<u64>>,
    check_runs: Mutex<HashMap<String, Vec<CheckRun>>>,
    // Runs counted in `total_count` but never returned
    unlisted_runs: Mutex<HashMap<String, u64>>,
    statuses: Mutex<HashMap<String, CombinedStatus>>,
    files: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<Call>>,
    // (operation, pr number) -> HTTP status to fail with
    failures: Mutex<HashMap<(&'static str, u64), u16>>,
}

impl MockPrOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open PR; listing order follows registration order
    pub fn add_pr(&self, number: u64, head_sha: &str) {
        self.prs.lock().unwrap().insert(
            number,
            MockPr {
                head_sha: head_sha.to_string(),
                ..Default::default()
            },
        );
        self.open_order.lock().unwrap().push(number);
    }

    pub fn set_files(&self, number: u64, files: Vec<FileChange>) {
        self.with_pr(number, |pr| pr.files = files);
    }

    /// Move the PR head to a new commit
    pub fn push(&self, number: u64, head_sha: &str) {
        self.with_pr(number, |pr| {
            pr.head_sha = head_sha.to_string();
        });
    }

    pub fn approve(&self, number: u64, login: &str) {
        self.with_pr(number, |pr| {
            pr.approvers.insert(login.to_string());
        });
    }

    pub fn revoke(&self, number: u64, login: &str) {
        self.with_pr(number, |pr| {
            pr.approvers.remove(login);
        });
    }

    pub fn set_labels(&self, number: u64, labels: &[&str]) {
        self.with_pr(number, |pr| {
            pr.labels = labels.iter().map(|l| l.to_string()).collect();
        });
    }

    pub fn labels(&self, number: u64) -> Vec<String> {
        self.prs
            .lock()
            .unwrap()
            .get(&number)
            .map(|pr| pr.labels.clone())
            .unwrap_or_default()
    }

    /// Every check run on `sha` succeeds
    pub fn set_checks_passing(&self, sha: &str) {
        self.set_check_runs(sha, vec![check_run("build", CheckConclusion::Success)]);
        self.set_status(sha, StatusState::Success, 1);
    }

    pub fn set_check_runs(&self, sha: &str, runs: Vec<CheckRun>) {
        self.check_runs.lock().unwrap().insert(sha.to_string(), runs);
    }

    pub fn set_unlisted_check_runs(&self, sha: &str, count: u64) {
        self.unlisted_runs
            .lock()
            .unwrap()
            .insert(sha.to_string(), count);
    }

    pub fn set_status(&self, sha: &str, state: StatusState, total_count: u64) {
        self.statuses
            .lock()
            .unwrap()
            .insert(sha.to_string(), CombinedStatus { state, total_count });
    }

    pub fn set_file_content(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    /// Make `operation` fail for PR `number` (0 for repository-level calls)
    pub fn fail(&self, operation: &'static str, number: u64, status: u16) {
        self.failures
            .lock()
            .unwrap()
            .insert((operation, number), status);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Label mutations only
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::AddLabels(..) | Call::RemoveLabel(..)))
            .collect()
    }

    fn with_pr(&self, number: u64, f: impl FnOnce(&mut MockPr)) {
        let mut prs = self.prs.lock().unwrap();
        f(prs.entry(number).or_default());
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, operation: &'static str, number: u64) -> GithubResult<()> {
        match self.failures.lock().unwrap().get(&(operation, number)) {
            Some(status) => Err(GithubError::Http {
                status: *status,
                message: format!("injected {} failure", operation),
            }),
            None => Ok(()),
        }
    }

    fn pr_field<T>(&self, number: u64, f: impl FnOnce(&MockPr) -> T) -> GithubResult<T> {
        self.prs
            .lock()
            .unwrap()
            .get(&number)
            .map(f)
            .ok_or_else(|| GithubError::Http {
                status: 404,
                message: format!("PR #{} not found", number),
            })
    }
}

pub fn check_run(name: &str, conclusion: CheckConclusion) -> CheckRun {
    CheckRun {
        name: name.to_string(),
        status: CheckStatus::Completed,
        conclusion: Some(conclusion),
    }
}

#[async_trait]
impl PrOperations for MockPrOperations {
    async fn list_files(
        &self,
        pr: &PrRef,
        early_exit_threshold: Option<usize>,
    ) -> GithubResult<Vec<FileChange>> {
        self.record(Call::ListFiles(pr.number, early_exit_threshold));
        self.check_failure("list_files", pr.number)?;
        self.pr_field(pr.number, |p| p.files.clone())
    }

    async fn get_approver_logins(&self, pr: &PrRef) -> GithubResult<HashSet<String>> {
        self.record(Call::GetApprovers(pr.number));
        self.check_failure("get_approver_logins", pr.number)?;
        self.pr_field(pr.number, |p| p.approvers.clone())
    }

    async fn get_labels(&self, pr: &PrRef) -> GithubResult<Vec<String>> {
        self.record(Call::GetLabels(pr.number));
        self.check_failure("get_labels", pr.number)?;
        self.pr_field(pr.number, |p| p.labels.clone())
    }

    async fn add_labels(&self, pr: &PrRef, labels: &[String]) -> GithubResult<()> {
        self.record(Call::AddLabels(pr.number, labels.to_vec()));
        self.check_failure("add_labels", pr.number)?;
        self.with_pr(pr.number, |p| {
            for label in labels {
                if !p.labels.contains(label) {
                    p.labels.push(label.clone());
                }
            }
        });
        Ok(())
    }

    async fn remove_label(&self, pr: &PrRef, label: &str) -> GithubResult<()> {
        self.record(Call::RemoveLabel(pr.number, label.to_string()));
        self.check_failure("remove_label", pr.number)?;
        self.with_pr(pr.number, |p| p.labels.retain(|l| l != label));
        Ok(())
    }

    async fn get_pull(&self, pr: &PrRef) -> GithubResult<PullRequest> {
        self.record(Call::GetPull(pr.number));
        self.check_failure("get_pull", pr.number)?;
        self.pr_field(pr.number, |p| {
            let mut pull = PullRequest::new(pr.number, p.head_sha.clone());
            pull.labels = p
                .labels
                .iter()
                .map(|name| Label { name: name.clone() })
                .collect();
            pull
        })
    }

    async fn get_check_runs_for_ref(
        &self,
        _owner: &str,
        _repo: &str,
        sha: &str,
    ) -> GithubResult<CheckRunList> {
        self.record(Call::GetCheckRuns(sha.to_string()));
        self.check_failure("get_check_runs_for_ref", 0)?;
        let runs = self
            .check_runs
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or_default();
        let unlisted = self
            .unlisted_runs
            .lock()
            .unwrap()
            .get(sha)
            .copied()
            .unwrap_or(0);
        Ok(CheckRunList {
            total_count: runs.len() as u64 + unlisted,
            check_runs: runs,
        })
    }

    async fn get_combined_status(
        &self,
        _owner: &str,
        _repo: &str,
        sha: &str,
    ) -> GithubResult<CombinedStatus> {
        self.record(Call::GetCombinedStatus(sha.to_string()));
        self.check_failure("get_combined_status", 0)?;
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or(CombinedStatus {
                state: StatusState::Pending,
                total_count: 0,
            }))
    }

    async fn list_open_pulls(&self, _owner: &str, _repo: &str) -> GithubResult<Vec<PullRequest>> {
        self.record(Call::ListOpenPulls);
        self.check_failure("list_open_pulls", 0)?;
        let order = self.open_order.lock().unwrap().clone();
        let prs = self.prs.lock().unwrap();
        Ok(order
            .into_iter()
            .filter_map(|number| {
                prs.get(&number).map(|p| {
                    let mut pull = PullRequest::new(number, p.head_sha.clone());
                    pull.labels = p
                        .labels
                        .iter()
                        .map(|name| Label { name: name.clone() })
                        .collect();
                    pull
                })
            })
            .collect())
    }

    async fn get_file_content(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
    ) -> GithubResult<Option<String>> {
        self.record(Call::GetFileContent(path.to_string()));
        self.check_failure("get_file_content", 0)?;
        Ok(self.files.lock().unwrap().get(path).cloned())
    }
}
