use crate::repo_config_loader::{PolicySource, RepoConfigLoader};
use axum::extract::FromRef;
use gatecrab_github::{PrOperations, WebhookSecret};
use std::sync::Arc;

/// Application state for Axum dependency injection
///
/// Holds the GitHub operations used by the evaluators, the policy source,
/// and the webhook secret for HMAC verification.
#[derive(Clone)]
pub struct AppState {
    /// GitHub operations (octocrab client in production, mocks in tests)
    pub github: Arc<dyn PrOperations>,

    /// Per-repository policy source
    pub policies: Arc<dyn PolicySource>,

    /// Webhook secret for HMAC verification
    pub webhook_secret: WebhookSecret,
}

impl AppState {
    pub fn new(
        github: Arc<dyn PrOperations>,
        policies: Arc<dyn PolicySource>,
        webhook_secret: WebhookSecret,
    ) -> Self {
        Self {
            github,
            policies,
            webhook_secret,
        }
    }

    /// State whose policies are read from each repository through `github`
    pub fn with_repo_policies(
        github: Arc<dyn PrOperations>,
        policy_path: &str,
        cache_ttl_seconds: u64,
        webhook_secret: WebhookSecret,
    ) -> Self {
        let loader = RepoConfigLoader::with_path(github.clone(), policy_path, cache_ttl_seconds);
        Self::new(github, Arc::new(loader), webhook_secret)
    }
}

impl FromRef<AppState> for WebhookSecret {
    fn from_ref(state: &AppState) -> Self {
        state.webhook_secret.clone()
    }
}
