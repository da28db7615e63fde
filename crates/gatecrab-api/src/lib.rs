pub mod automerge;
pub mod error;
pub mod evaluator;
pub mod extractors;
pub mod governance;
pub mod health;
pub mod readiness;
pub mod repo_config_loader;
pub mod state;
pub mod status_fanout;
pub mod webhook_handler;

use axum::{
    Router,
    routing::{get, post},
};

// Re-export commonly used types
pub use automerge::{automerge_policy, evaluate_automerge};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use evaluator::{EvalInput, Gate, LabelPolicy, evaluate};
pub use extractors::VerifiedWebhookPayload;
pub use governance::{PrOutcomes, evaluate_pull_request};
pub use health::health;
pub use readiness::{evaluate_readiness, readiness_policy};
pub use repo_config_loader::{
    DEFAULT_POLICY_PATH, PolicySource, RepoConfigLoader, StaticPolicySource, parse_policy,
};
pub use state::AppState;
pub use status_fanout::{FanOutReport, PrEvaluation, fan_out_status};
pub use webhook_handler::handle_webhook;

/// Router with the health and webhook endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/github", post(handle_webhook))
        .with_state(state)
}
