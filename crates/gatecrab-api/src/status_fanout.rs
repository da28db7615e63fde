use crate::error::{ApiError, ApiResult};
use crate::evaluator::EvalInput;
use crate::readiness::evaluate_readiness;
use crate::repo_config_loader::PolicySource;
use gatecrab_core::{LabelOutcome, PrRef};
use gatecrab_github::PrOperations;
use serde::Serialize;
use tracing::{debug, error, info};

/// Outcome for one PR touched by a status event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrEvaluation {
    pub number: u64,
    pub outcome: LabelOutcome,
}

/// Result of a successful fan-out
#[derive(Debug, Clone, Default, Serialize)]
pub struct FanOutReport {
    pub sha: String,
    pub evaluated: Vec<PrEvaluation>,
}

/// Re-evaluate merge readiness for every open PR whose head is `sha`
///
/// PRs are evaluated one at a time in listing order. A failure on one PR is
/// logged and does not stop the rest; any failure turns the whole call into
/// [`ApiError::FanOut`] once every PR has been attempted.
pub async fn fan_out_status(
    ops: &dyn PrOperations,
    policies: &dyn PolicySource,
    owner: &str,
    repo: &str,
    sha: &str,
) -> ApiResult<FanOutReport> {
    let mut report = FanOutReport {
        sha: sha.to_string(),
        evaluated: Vec::new(),
    };

    let policy = policies.load(owner, repo).await?;
    if policy.merge_readiness.is_none() {
        debug!(owner, repo, sha, "Merge readiness disabled, ignoring status event");
        return Ok(report);
    }

    let pulls = ops.list_open_pulls(owner, repo).await?;
    let matching: Vec<_> = pulls.into_iter().filter(|p| p.head.sha == sha).collect();
    info!(owner, repo, sha, count = matching.len(), "Status event matched open PRs");

    let mut failed = 0;
    for pull in &matching {
        let pr = PrRef::new(owner, repo, pull.number);
        let labels = pull.label_names();
        let input = EvalInput::new(&pr).with_head_sha(sha).with_labels(&labels);

        match evaluate_readiness(ops, &policy, input).await {
            Ok(outcome) => report.evaluated.push(PrEvaluation {
                number: pull.number,
                outcome,
            }),
            Err(e) => {
                failed += 1;
                error!(
                    repo = %pr.full_name(),
                    pr = pull.number,
                    sha,
                    "Merge-readiness evaluation failed: {}",
                    e
                );
            }
        }
    }

    if failed > 0 {
        return Err(ApiError::FanOut { failed });
    }

    Ok(report)
}
