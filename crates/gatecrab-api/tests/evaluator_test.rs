/// Label transition tests for the automerge and merge-readiness evaluators
mod common;

use common::mock_ops::{Call, MockPrOperations, check_run};
use common::{OWNER, REPO, governed_policy};
use gatecrab_api::{ApiError, EvalInput, evaluate_automerge, evaluate_pull_request, evaluate_readiness};
use gatecrab_core::{
    AutomergePolicy, CheckConclusion, FileChange, LabelOutcome, PrRef, RepoPolicy, StatusState,
};
use gatecrab_github::GithubError;

const SHA: &str = "abc123def456";

fn pr(number: u64) -> PrRef {
    PrRef::new(OWNER, REPO, number)
}

/// PR 1 with a docs-only diff, two trusted approvals and green CI
fn docs_pr() -> MockPrOperations {
    let ops = MockPrOperations::new();
    ops.add_pr(1, SHA);
    ops.set_files(
        1,
        vec![
            FileChange::new("README.md", 10, 5),
            FileChange::new("docs/guide.md", 15, 10),
        ],
    );
    ops.approve(1, "alice");
    ops.approve(1, "bob");
    ops.set_checks_passing(SHA);
    ops
}

#[tokio::test]
async fn test_docs_pr_is_labeled() {
    let ops = docs_pr();
    let policy = governed_policy();

    let outcome = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(outcome, LabelOutcome::Labeled);
    assert_eq!(ops.labels(1), vec!["automerge"]);
    assert_eq!(
        ops.mutations(),
        vec![Call::AddLabels(1, vec!["automerge".to_string()])]
    );
}

#[tokio::test]
async fn test_second_run_is_noop() {
    let ops = docs_pr();
    let policy = governed_policy();

    let first = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();
    let second = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(first, LabelOutcome::Labeled);
    assert_eq!(second, LabelOutcome::Noop { labeled: true });
    assert_eq!(ops.mutations().len(), 1);
}

#[tokio::test]
async fn test_revoked_approval_unlabels() {
    let ops = docs_pr();
    ops.set_labels(1, &["automerge"]);
    ops.revoke(1, "bob");
    let policy = governed_policy();

    let outcome = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        LabelOutcome::Unlabeled {
            reason: "insufficient approvals: 1/2".to_string()
        }
    );
    assert!(ops.labels(1).is_empty());
    let calls = ops.calls();
    assert!(!calls.contains(&Call::GetPull(1)));
    assert!(!calls.contains(&Call::GetCheckRuns(SHA.to_string())));
    assert!(!calls.contains(&Call::GetCombinedStatus(SHA.to_string())));

    let again = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();
    assert_eq!(again, LabelOutcome::Noop { labeled: false });
}

#[tokio::test]
async fn test_disabled_policy_makes_no_calls() {
    let ops = docs_pr();
    let policy = RepoPolicy::default();

    let automerge = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();
    let readiness = evaluate_readiness(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(automerge, LabelOutcome::Skipped);
    assert_eq!(readiness, LabelOutcome::Skipped);
    assert!(ops.calls().is_empty());
}

#[tokio::test]
async fn test_file_failure_short_circuits() {
    let ops = docs_pr();
    ops.set_files(1, vec![FileChange::new("src/main.rs", 1, 1)]);
    let policy = governed_policy();

    let outcome = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(outcome, LabelOutcome::Noop { labeled: false });
    let calls = ops.calls();
    assert_eq!(calls, vec![Call::GetLabels(1), Call::ListFiles(1, Some(6))]);
}

#[tokio::test]
async fn test_denied_file_removes_label() {
    let ops = docs_pr();
    ops.set_labels(1, &["automerge", "docs"]);
    ops.set_files(
        1,
        vec![
            FileChange::new("README.md", 1, 0),
            FileChange::new(".github/workflows/ci.md", 1, 0),
        ],
    );
    let policy = governed_policy();

    let outcome = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        LabelOutcome::Unlabeled {
            reason: "file not allowed by path policy: .github/workflows/ci.md".to_string()
        }
    );
    assert_eq!(ops.labels(1), vec!["docs"]);
}

#[tokio::test]
async fn test_scoped_label_variants_removed() {
    let ops = docs_pr();
    ops.set_labels(1, &["automerge:squash", "automerge-later"]);
    ops.revoke(1, "alice");
    let policy = governed_policy();

    let outcome = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert!(matches!(outcome, LabelOutcome::Unlabeled { .. }));
    assert_eq!(ops.labels(1), vec!["automerge-later"]);
}

#[tokio::test]
async fn test_failing_ci_reports_short_sha() {
    let ops = docs_pr();
    ops.set_check_runs(SHA, vec![check_run("build", CheckConclusion::Failure)]);
    let policy = governed_policy();

    let outcome = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(outcome, LabelOutcome::Noop { labeled: false });

    ops.set_labels(1, &["automerge"]);
    let outcome = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        LabelOutcome::Unlabeled {
            reason: "checks not passing for abc123d".to_string()
        }
    );
}

#[tokio::test]
async fn test_truncated_check_listing_blocks() {
    let ops = docs_pr();
    ops.set_unlisted_check_runs(SHA, 1);
    let policy = governed_policy();

    let outcome = evaluate_readiness(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(outcome, LabelOutcome::Noop { labeled: false });
    assert!(ops.mutations().is_empty());
}

#[tokio::test]
async fn test_insufficient_approvals_skip_ci_lookup() {
    let ops = docs_pr();
    ops.revoke(1, "bob");
    let policy = governed_policy();

    let outcome = evaluate_readiness(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(outcome, LabelOutcome::Noop { labeled: false });
    assert_eq!(ops.calls(), vec![Call::GetLabels(1), Call::GetApprovers(1)]);
}

#[tokio::test]
async fn test_failing_legacy_status_blocks() {
    let ops = docs_pr();
    ops.set_status(SHA, StatusState::Error, 3);
    let policy = governed_policy();

    let outcome = evaluate_readiness(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(outcome, LabelOutcome::Noop { labeled: false });
}

#[tokio::test]
async fn test_no_ci_configured_passes() {
    let ops = MockPrOperations::new();
    ops.add_pr(2, "feedface");
    ops.approve(2, "alice");
    ops.approve(2, "bob");
    let policy = governed_policy();

    let outcome = evaluate_readiness(&ops, &policy, EvalInput::new(&pr(2)))
        .await
        .unwrap();

    assert_eq!(outcome, LabelOutcome::Labeled);
    assert_eq!(ops.labels(2), vec!["merge-ready"]);
}

#[tokio::test]
async fn test_supplied_sha_and_labels_skip_fetches() {
    let ops = docs_pr();
    let policy = governed_policy();
    let labels = vec!["automerge".to_string()];
    let target = pr(1);
    let input = EvalInput::new(&target)
        .with_head_sha(SHA)
        .with_labels(&labels);

    let outcome = evaluate_automerge(&ops, &policy, input).await.unwrap();

    assert_eq!(outcome, LabelOutcome::Noop { labeled: true });
    let calls = ops.calls();
    assert!(!calls.contains(&Call::GetLabels(1)));
    assert!(!calls.contains(&Call::GetPull(1)));
    assert!(calls.contains(&Call::GetCheckRuns(SHA.to_string())));
}

#[tokio::test]
async fn test_head_sha_fetched_when_missing() {
    let ops = docs_pr();
    let policy = governed_policy();

    evaluate_readiness(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    let calls = ops.calls();
    let pull = calls.iter().position(|c| *c == Call::GetPull(1)).unwrap();
    let checks = calls
        .iter()
        .position(|c| *c == Call::GetCheckRuns(SHA.to_string()))
        .unwrap();
    assert!(pull < checks);
}

#[tokio::test]
async fn test_fetch_error_prevents_mutation() {
    let ops = docs_pr();
    ops.set_labels(1, &["automerge"]);
    ops.fail("get_approver_logins", 1, 403);
    let policy = governed_policy();

    let err = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Github(GithubError::Http { status: 403, .. })
    ));
    assert!(ops.mutations().is_empty());
    assert_eq!(ops.labels(1), vec!["automerge"]);
}

#[tokio::test]
async fn test_dry_run_never_mutates() {
    let ops = docs_pr();
    let mut policy = governed_policy();
    if let Some(automerge) = policy.automerge.as_mut() {
        automerge.dry_run = true;
    }

    let outcome = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();
    assert_eq!(outcome, LabelOutcome::Noop { labeled: false });

    ops.set_labels(1, &["automerge"]);
    ops.revoke(1, "alice");
    let outcome = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();
    assert_eq!(outcome, LabelOutcome::Noop { labeled: true });
    assert!(ops.mutations().is_empty());
}

#[tokio::test]
async fn test_zero_required_approvals_skips_review_fetch() {
    let ops = docs_pr();
    let policy = RepoPolicy {
        automerge: Some(AutomergePolicy {
            allowed_paths: vec!["**".to_string()],
            min_approvals: 0,
            require_checks: false,
            ..Default::default()
        }),
        ..Default::default()
    };

    let outcome = evaluate_automerge(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(outcome, LabelOutcome::Labeled);
    assert!(!ops.calls().contains(&Call::GetApprovers(1)));
}

#[tokio::test]
async fn test_untrusted_approvals_do_not_count() {
    let ops = docs_pr();
    ops.revoke(1, "alice");
    ops.revoke(1, "bob");
    ops.approve(1, "mallory");
    ops.approve(1, "eve");
    let policy = governed_policy();

    let outcome = evaluate_readiness(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();
    assert_eq!(outcome, LabelOutcome::Noop { labeled: false });
}

#[tokio::test]
async fn test_both_evaluators_together() {
    let ops = docs_pr();
    let policy = governed_policy();

    let outcomes = evaluate_pull_request(&ops, &policy, EvalInput::new(&pr(1)))
        .await
        .unwrap();

    assert_eq!(outcomes.pr, "octo/repo#1");
    assert_eq!(outcomes.automerge, LabelOutcome::Labeled);
    assert_eq!(outcomes.merge_readiness, LabelOutcome::Labeled);
    let mut labels = ops.labels(1);
    labels.sort();
    assert_eq!(labels, vec!["automerge", "merge-ready"]);
}
