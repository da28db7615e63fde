use crate::error::ApiResult;
use crate::evaluator::{EvalInput, Gate, LabelPolicy, evaluate};
use gatecrab_core::{LabelOutcome, RepoPolicy};
use gatecrab_github::PrOperations;
use tracing::debug;

/// Build the automerge label policy, `None` when the repository has not
/// enabled it
///
/// Gates run files, approvals, then CI when required.
pub fn automerge_policy(repo: &RepoPolicy) -> Option<LabelPolicy<'_>> {
    let policy = repo.automerge.as_ref()?;

    let mut gates = vec![
        Gate::Files(policy),
        Gate::Approvals {
            trusted: &repo.trusted_reviewers,
            required: policy.min_approvals,
        },
    ];
    if policy.require_checks {
        gates.push(Gate::Checks);
    }

    Some(LabelPolicy {
        name: "automerge",
        label: &repo.labels.automerge,
        gates,
        dry_run: policy.dry_run,
    })
}

/// Evaluate the automerge label for one PR
pub async fn evaluate_automerge(
    ops: &dyn PrOperations,
    repo: &RepoPolicy,
    input: EvalInput<'_>,
) -> ApiResult<LabelOutcome> {
    let Some(policy) = automerge_policy(repo) else {
        debug!(pr = %input.pr, "Automerge disabled");
        return Ok(LabelOutcome::Skipped);
    };

    evaluate(ops, &policy, input).await
}
