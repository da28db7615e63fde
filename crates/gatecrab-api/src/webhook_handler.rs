use crate::{
    error::ApiResult,
    evaluator::EvalInput,
    extractors::VerifiedWebhookPayload,
    governance::{PrOutcomes, evaluate_pull_request},
    state::AppState,
    status_fanout::fan_out_status,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use gatecrab_core::PrRef;
use gatecrab_github::{
    CheckRunEvent, CheckSuiteEvent, CheckTarget, PullRequestEvent, PullRequestReviewEvent,
    PushEvent, Repository, StatusEvent,
};
use serde_json::{Value, json};
use tracing::{debug, info};

const PULL_REQUEST_ACTIONS: &[&str] = &[
    "opened",
    "reopened",
    "synchronize",
    "ready_for_review",
    "edited",
    "labeled",
    "unlabeled",
];

const REVIEW_ACTIONS: &[&str] = &["submitted", "edited", "dismissed"];

/// Webhook handler for GitHub events
///
/// The signature is verified by [`VerifiedWebhookPayload`] before this runs.
/// Events are routed by `X-GitHub-Event`; unhandled events and actions are
/// acknowledged with 200 so GitHub does not mark the delivery failed.
pub async fn handle_webhook(
    State(state): State<AppState>,
    payload: VerifiedWebhookPayload,
) -> ApiResult<impl IntoResponse> {
    let VerifiedWebhookPayload {
        event,
        delivery,
        body,
    } = payload;
    debug!(event = %event, delivery = ?delivery, "Received webhook");

    let response = match event.as_str() {
        "pull_request" => handle_pull_request(&state, serde_json::from_slice(&body)?).await?,
        "pull_request_review" => handle_review(&state, serde_json::from_slice(&body)?).await?,
        "check_run" => {
            let event: CheckRunEvent = serde_json::from_slice(&body)?;
            handle_check(&state, &event.action, &event.check_run, &event.repository).await?
        }
        "check_suite" => {
            let event: CheckSuiteEvent = serde_json::from_slice(&body)?;
            handle_check(&state, &event.action, &event.check_suite, &event.repository).await?
        }
        "status" => handle_status(&state, serde_json::from_slice(&body)?).await?,
        "push" => handle_push(&state, serde_json::from_slice(&body)?).await?,
        other => ignored(&format!("event {} not handled", other)),
    };

    Ok((StatusCode::OK, Json(response)))
}

fn ignored(message: &str) -> Value {
    debug!("Ignoring webhook: {}", message);
    json!({ "status": "ignored", "message": message })
}

fn processed(results: &[PrOutcomes]) -> Value {
    json!({ "status": "ok", "results": results })
}

async fn handle_pull_request(state: &AppState, event: PullRequestEvent) -> ApiResult<Value> {
    if !PULL_REQUEST_ACTIONS.contains(&event.action.as_str()) {
        return Ok(ignored(&format!("pull_request action {} not handled", event.action)));
    }
    if !event.pull_request.is_open() || event.pull_request.draft {
        return Ok(ignored("pull request is closed or draft"));
    }

    let pr = event.repository.pr(event.pull_request.number);
    let labels = event.pull_request.label_names();
    let input = EvalInput::new(&pr)
        .with_head_sha(&event.pull_request.head.sha)
        .with_labels(&labels);

    info!(pr = %pr, action = %event.action, "Evaluating pull request");
    let policy = state.policies.load(&pr.owner, &pr.repo).await?;
    let outcomes = evaluate_pull_request(state.github.as_ref(), &policy, input).await?;

    Ok(processed(&[outcomes]))
}

async fn handle_review(state: &AppState, event: PullRequestReviewEvent) -> ApiResult<Value> {
    if !REVIEW_ACTIONS.contains(&event.action.as_str()) {
        return Ok(ignored(&format!(
            "pull_request_review action {} not handled",
            event.action
        )));
    }
    if !event.pull_request.is_open() || event.pull_request.draft {
        return Ok(ignored("pull request is closed or draft"));
    }

    let pr = event.repository.pr(event.pull_request.number);
    let labels = event.pull_request.label_names();
    let input = EvalInput::new(&pr)
        .with_head_sha(&event.pull_request.head.sha)
        .with_labels(&labels);

    info!(pr = %pr, action = %event.action, "Evaluating after review");
    let policy = state.policies.load(&pr.owner, &pr.repo).await?;
    let outcomes = evaluate_pull_request(state.github.as_ref(), &policy, input).await?;

    Ok(processed(&[outcomes]))
}

async fn handle_check(
    state: &AppState,
    action: &str,
    target: &CheckTarget,
    repository: &Repository,
) -> ApiResult<Value> {
    if action != "completed" {
        return Ok(ignored(&format!("check action {} not handled", action)));
    }
    if target.pull_requests.is_empty() {
        return Ok(ignored("check is not associated with a pull request"));
    }

    let policy = state
        .policies
        .load(&repository.owner.login, &repository.name)
        .await?;

    let mut results = Vec::with_capacity(target.pull_requests.len());
    for pull in &target.pull_requests {
        let pr: PrRef = repository.pr(pull.number);

        // The check SHA only stands in for the head when the payload says they match;
        // otherwise the evaluator resolves the current head itself
        let input = match pull.head_sha() {
            Some(head) if head == target.head_sha => {
                EvalInput::new(&pr).with_head_sha(&target.head_sha)
            }
            Some(head) => {
                debug!(
                    pr = %pr,
                    check_sha = %target.head_sha,
                    head_sha = %head,
                    "Check completed on a commit that is no longer the PR head, skipping"
                );
                continue;
            }
            None => EvalInput::new(&pr),
        };

        info!(pr = %pr, sha = %target.head_sha, "Evaluating after check completion");
        results.push(evaluate_pull_request(state.github.as_ref(), &policy, input).await?);
    }

    if results.is_empty() {
        return Ok(ignored("check completed on a stale commit"));
    }

    Ok(processed(&results))
}

async fn handle_status(state: &AppState, event: StatusEvent) -> ApiResult<Value> {
    let report = fan_out_status(
        state.github.as_ref(),
        state.policies.as_ref(),
        &event.repository.owner.login,
        &event.repository.name,
        &event.sha,
    )
    .await?;

    Ok(json!({ "status": "ok", "fanout": report }))
}

async fn handle_push(state: &AppState, event: PushEvent) -> ApiResult<Value> {
    if !event.is_default_branch() {
        return Ok(ignored("push is not to the default branch"));
    }
    let Some(path) = state.policies.policy_path() else {
        return Ok(ignored("policy is not read from the repository"));
    };
    if !event.touches(path) {
        return Ok(ignored("push does not change the policy file"));
    }

    let repository = &event.repository;
    info!(repo = %repository.full_name, path, "Policy file changed, dropping cached policy");
    state
        .policies
        .invalidate(&repository.owner.login, &repository.name)
        .await;

    Ok(json!({ "status": "ok", "policy_invalidated": true }))
}
