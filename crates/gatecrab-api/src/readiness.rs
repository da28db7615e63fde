use crate::error::ApiResult;
use crate::evaluator::{EvalInput, Gate, LabelPolicy, evaluate};
use gatecrab_core::{LabelOutcome, RepoPolicy};
use gatecrab_github::PrOperations;
use tracing::debug;

/// Build the merge-ready label policy, `None` when the repository has not
/// enabled it
pub fn readiness_policy(repo: &RepoPolicy) -> Option<LabelPolicy<'_>> {
    let policy = repo.merge_readiness.as_ref()?;

    let mut gates = vec![Gate::Approvals {
        trusted: policy.reviewers(&repo.trusted_reviewers),
        required: policy.required_approvals,
    }];
    if policy.require_checks {
        gates.push(Gate::Checks);
    }

    Some(LabelPolicy {
        name: "merge-readiness",
        label: &repo.labels.merge_ready,
        gates,
        dry_run: false,
    })
}

/// Evaluate the merge-ready label for one PR
pub async fn evaluate_readiness(
    ops: &dyn PrOperations,
    repo: &RepoPolicy,
    input: EvalInput<'_>,
) -> ApiResult<LabelOutcome> {
    let Some(policy) = readiness_policy(repo) else {
        debug!(pr = %input.pr, "Merge readiness disabled");
        return Ok(LabelOutcome::Skipped);
    };

    evaluate(ops, &policy, input).await
}
