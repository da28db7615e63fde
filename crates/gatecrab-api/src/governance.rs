use crate::automerge::evaluate_automerge;
use crate::error::ApiResult;
use crate::evaluator::EvalInput;
use crate::readiness::evaluate_readiness;
use gatecrab_core::{LabelOutcome, RepoPolicy};
use gatecrab_github::PrOperations;
use serde::Serialize;

/// Outcomes of both evaluators for one PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrOutcomes {
    pub pr: String,
    pub automerge: LabelOutcome,
    pub merge_readiness: LabelOutcome,
}

/// Run automerge then merge readiness for one PR
///
/// An error from either evaluator is returned as is; the other evaluator's
/// label is left as it was.
pub async fn evaluate_pull_request(
    ops: &dyn PrOperations,
    policy: &RepoPolicy,
    input: EvalInput<'_>,
) -> ApiResult<PrOutcomes> {
    let automerge = evaluate_automerge(ops, policy, input).await?;
    let merge_readiness = evaluate_readiness(ops, policy, input).await?;

    Ok(PrOutcomes {
        pr: input.pr.to_string(),
        automerge,
        merge_readiness,
    })
}
