use crate::error::ApiResult;
use async_trait::async_trait;
use gatecrab_core::{CoreError, PathRules, RepoPolicy};
use gatecrab_github::PrOperations;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Default location of the policy file inside a repository
pub const DEFAULT_POLICY_PATH: &str = ".github/gatecrab.toml";

/// Source of per-repository governance policy
///
/// A missing policy, or a missing block inside it, disables the matching
/// evaluator. Errors are reserved for failures to reach the source.
#[async_trait]
pub trait PolicySource: Send + Sync {
    async fn load(&self, owner: &str, repo: &str) -> ApiResult<RepoPolicy>;

    /// Repository path the policy is read from, if it comes from the repository
    fn policy_path(&self) -> Option<&str> {
        None
    }

    /// Forget anything remembered about a repository's policy
    async fn invalidate(&self, _owner: &str, _repo: &str) {}
}

/// Fixed policy for every repository
#[derive(Debug, Clone, Default)]
pub struct StaticPolicySource(pub RepoPolicy);

#[async_trait]
impl PolicySource for StaticPolicySource {
    async fn load(&self, _owner: &str, _repo: &str) -> ApiResult<RepoPolicy> {
        Ok(self.0.clone())
    }
}

/// Parse and validate a policy file
///
/// Path patterns are compiled up front so a bad glob is caught when the
/// file is loaded instead of during an evaluation.
pub fn parse_policy(content: &str) -> Result<RepoPolicy, CoreError> {
    let policy: RepoPolicy =
        toml::from_str(content).map_err(|e| CoreError::InvalidConfig(e.message().to_string()))?;

    if let Some(automerge) = &policy.automerge {
        PathRules::new(&automerge.allowed_paths, &automerge.deny_paths)?;
    }

    Ok(policy)
}

/// Cached repository policy with TTL
#[derive(Debug, Clone)]
struct CachedPolicy {
    policy: RepoPolicy,
    fetched_at: Instant,
}

/// Repository policy loader with caching
///
/// Fetches the policy file from the repository's default branch and caches
/// it per repository. A missing file yields the default (disabled) policy;
/// an invalid file is logged and also treated as disabled. Fetch failures
/// are returned to the caller and never cached.
pub struct RepoConfigLoader {
    github_client: Arc<dyn PrOperations>,
    path: String,
    cache: RwLock<HashMap<String, CachedPolicy>>,
    cache_ttl: Duration,
}

impl RepoConfigLoader {
    pub fn new(github_client: Arc<dyn PrOperations>, cache_ttl_seconds: u64) -> Self {
        Self::with_path(github_client, DEFAULT_POLICY_PATH, cache_ttl_seconds)
    }

    pub fn with_path(
        github_client: Arc<dyn PrOperations>,
        path: impl Into<String>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            github_client,
            path: path.into(),
            cache: RwLock::new(HashMap::new()),
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
        }
    }

    /// Get policy for a repository, from cache when fresh
    pub async fn get_policy(&self, owner: &str, repo: &str) -> ApiResult<RepoPolicy> {
        let cache_key = format!("{}/{}", owner, repo);

        {
            let cache_guard = self.cache.read().await;
            if let Some(cached) = cache_guard.get(&cache_key) {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    debug!(repo = %cache_key, "Using cached policy");
                    return Ok(cached.policy.clone());
                }
            }
        }

        debug!(repo = %cache_key, path = %self.path, "Fetching policy file");
        let content = self
            .github_client
            .get_file_content(owner, repo, &self.path)
            .await?;

        let policy = match content {
            None => {
                info!(repo = %cache_key, "No policy file, governance disabled");
                RepoPolicy::default()
            }
            Some(text) => match parse_policy(&text) {
                Ok(policy) => {
                    info!(
                        repo = %cache_key,
                        automerge = policy.automerge.is_some(),
                        merge_readiness = policy.merge_readiness.is_some(),
                        "Loaded policy"
                    );
                    policy
                }
                Err(e) => {
                    warn!(repo = %cache_key, "Invalid {}: {}. Governance disabled.", self.path, e);
                    RepoPolicy::default()
                }
            },
        };

        let mut cache_guard = self.cache.write().await;
        cache_guard.insert(
            cache_key,
            CachedPolicy {
                policy: policy.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(policy)
    }

    /// Drop the cached policy for one repository
    pub async fn invalidate(&self, owner: &str, repo: &str) {
        let cache_key = format!("{}/{}", owner, repo);
        self.cache.write().await.remove(&cache_key);
        info!(repo = %cache_key, "Invalidated cached policy");
    }

    pub async fn cache_size(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl PolicySource for RepoConfigLoader {
    async fn load(&self, owner: &str, repo: &str) -> ApiResult<RepoPolicy> {
        self.get_policy(owner, repo).await
    }

    fn policy_path(&self) -> Option<&str> {
        Some(&self.path)
    }

    async fn invalidate(&self, owner: &str, repo: &str) {
        RepoConfigLoader::invalidate(self, owner, repo).await
    }
}
