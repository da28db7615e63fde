//! Label state-transition pipeline shared by the automerge and
//! merge-readiness evaluators.
//!
//! A [`LabelPolicy`] is a label name plus an ordered list of [`Gate`]s.
//! Gates run cheapest first and the first failing gate decides the verdict.
//! All fetches happen before the single label mutation at the end, so a
//! failed fetch never leaves a half-applied decision behind.

use crate::error::ApiResult;
use gatecrab_core::{
    AutomergePolicy, LabelOutcome, PrRef, checks_failed_reason, ci_passing, classify_files,
    has_label, insufficient_approvals_reason, is_label_match, trusted_approval_count,
};
use gatecrab_github::PrOperations;
use tracing::{debug, info};

/// One eligibility check in a label policy
#[derive(Debug, Clone)]
pub enum Gate<'a> {
    /// Changed files must satisfy the automerge path and size rules
    Files(&'a AutomergePolicy),

    /// At least `required` of `trusted` must currently approve
    Approvals {
        trusted: &'a [String],
        required: usize,
    },

    /// CI must be green on the head commit
    Checks,
}

/// Label plus the gates that decide whether it belongs on a PR
#[derive(Debug, Clone)]
pub struct LabelPolicy<'a> {
    /// Evaluator name used in logs
    pub name: &'static str,
    pub label: &'a str,
    pub gates: Vec<Gate<'a>>,
    /// Compute and log the verdict without touching labels
    pub dry_run: bool,
}

/// What the caller already knows about the PR
#[derive(Debug, Clone, Copy)]
pub struct EvalInput<'a> {
    pub pr: &'a PrRef,
    /// Head commit, fetched from the PR when absent
    pub head_sha: Option<&'a str>,
    /// Current labels, fetched when absent
    pub labels: Option<&'a [String]>,
}

impl<'a> EvalInput<'a> {
    pub fn new(pr: &'a PrRef) -> Self {
        Self {
            pr,
            head_sha: None,
            labels: None,
        }
    }

    pub fn with_head_sha(mut self, sha: &'a str) -> Self {
        self.head_sha = Some(sha);
        self
    }

    pub fn with_labels(mut self, labels: &'a [String]) -> Self {
        self.labels = Some(labels);
        self
    }
}

/// Run one gate, returning the failure reason if it does not pass
async fn check_gate(
    ops: &dyn PrOperations,
    gate: &Gate<'_>,
    input: &EvalInput<'_>,
    head_sha: &mut Option<String>,
) -> ApiResult<Option<String>> {
    match gate {
        Gate::Files(policy) => {
            let files = ops
                .list_files(input.pr, Some(policy.max_files.saturating_add(1)))
                .await?;
            let classification = classify_files(&files, policy)?;
            debug!(pr = %input.pr, reason = %classification.reason, "File classification");
            Ok((!classification.eligible).then_some(classification.reason))
        }
        Gate::Approvals { trusted, required } => {
            if *required == 0 {
                return Ok(None);
            }
            let approvers = ops.get_approver_logins(input.pr).await?;
            let have = trusted_approval_count(&approvers, *trusted);
            debug!(pr = %input.pr, have, need = *required, "Trusted approvals");
            Ok((have < *required).then(|| insufficient_approvals_reason(have, *required)))
        }
        Gate::Checks => {
            let sha = match head_sha {
                Some(sha) => sha.clone(),
                None => {
                    let sha = ops.get_pull(input.pr).await?.head.sha;
                    *head_sha = Some(sha.clone());
                    sha
                }
            };

            let check_runs = ops
                .get_check_runs_for_ref(&input.pr.owner, &input.pr.repo, &sha)
                .await?;
            let combined = ops
                .get_combined_status(&input.pr.owner, &input.pr.repo, &sha)
                .await?;

            // A truncated listing may hide failing runs
            let passing =
                check_runs.is_complete() && ci_passing(&check_runs.check_runs, Some(&combined));
            debug!(pr = %input.pr, sha = %sha, passing, "CI status");
            Ok((!passing).then(|| checks_failed_reason(&sha)))
        }
    }
}

/// Evaluate a label policy against one PR and apply the resulting transition
pub async fn evaluate(
    ops: &dyn PrOperations,
    policy: &LabelPolicy<'_>,
    input: EvalInput<'_>,
) -> ApiResult<LabelOutcome> {
    let fetched;
    let labels = match input.labels {
        Some(labels) => labels,
        None => {
            fetched = ops.get_labels(input.pr).await?;
            &fetched
        }
    };
    let labeled = has_label(labels, policy.label);

    let mut head_sha = input.head_sha.map(str::to_string);
    let mut failure = None;
    for gate in &policy.gates {
        if let Some(reason) = check_gate(ops, gate, &input, &mut head_sha).await? {
            failure = Some(reason);
            break;
        }
    }

    if policy.dry_run {
        info!(
            evaluator = policy.name,
            pr = %input.pr,
            eligible = failure.is_none(),
            reason = failure.as_deref().unwrap_or("all checks passed"),
            "Dry run, labels left unchanged"
        );
        return Ok(LabelOutcome::Noop { labeled });
    }

    let outcome = match failure {
        Some(reason) if labeled => {
            for label in labels.iter().filter(|l| is_label_match(l, policy.label)) {
                ops.remove_label(input.pr, label).await?;
            }
            LabelOutcome::Unlabeled { reason }
        }
        Some(reason) => {
            debug!(evaluator = policy.name, pr = %input.pr, reason = %reason, "Not eligible");
            LabelOutcome::Noop { labeled: false }
        }
        None if labeled => LabelOutcome::Noop { labeled: true },
        None => {
            ops.add_labels(input.pr, &[policy.label.to_string()]).await?;
            LabelOutcome::Labeled
        }
    };

    if outcome.is_transition() {
        info!(evaluator = policy.name, pr = %input.pr, outcome = %outcome, "Label updated");
    }

    Ok(outcome)
}
