use crate::{
    error::{GithubError, GithubResult},
    ops::PrOperations,
    retry::RetryPolicy,
    reviews::current_approvers,
    types::{CheckRunList, Label, PullRequest, Review},
};
use async_trait::async_trait;
use base64::Engine;
use gatecrab_core::{CombinedStatus, FileChange, PrRef};
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashSet;
use tracing::{debug, warn};

/// GitHub caps list endpoints at 100 items per page
const PAGE_SIZE: usize = 100;

/// The files endpoint stops at 3000 entries
const MAX_FILE_PAGES: u32 = 30;

/// Upper bound on check runs read per commit
const MAX_CHECK_RUN_PAGES: u32 = 10;

#[derive(Serialize)]
struct PageParams {
    per_page: usize,
    page: u32,
}

#[derive(Serialize)]
struct OpenPullsParams {
    state: &'static str,
    sort: &'static str,
    direction: &'static str,
    per_page: usize,
}

#[derive(Serialize)]
struct LabelsBody<'a> {
    labels: &'a [String],
}

#[derive(Deserialize)]
struct ContentResponse {
    content: Option<String>,
    encoding: Option<String>,
}

/// GitHub API client for the governance evaluators
///
/// Every call goes through the retry policy, so transient failures are
/// retried before they surface.
pub struct GithubApiClient {
    client: Octocrab,
    retry: RetryPolicy,
}

impl GithubApiClient {
    /// Create new GitHub API client with authentication token
    pub fn new(token: String) -> GithubResult<Self> {
        Self::build(token, None)
    }

    /// Create a client against a custom API root (GitHub Enterprise or tests)
    pub fn with_base_uri(token: String, base_uri: &str) -> GithubResult<Self> {
        Self::build(token, Some(base_uri))
    }

    fn build(token: String, base_uri: Option<&str>) -> GithubResult<Self> {
        // Retries are owned by RetryPolicy
        let mut builder = Octocrab::builder()
            .personal_token(token)
            .add_retry_config(RetryConfig::None);

        if let Some(uri) = base_uri {
            builder = builder.base_uri(uri).map_err(|e| {
                GithubError::ApiError(format!("Invalid GitHub base URI {}: {}", uri, e))
            })?;
        }

        let client = builder.build().map_err(|e| {
            GithubError::ApiError(format!("Failed to create octocrab client: {}", e))
        })?;

        Ok(Self::from_octocrab(client))
    }

    /// Create client from existing octocrab instance
    pub fn from_octocrab(client: Octocrab) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn get_json<R, P>(&self, operation: &str, route: &str, params: Option<&P>) -> GithubResult<R>
    where
        R: DeserializeOwned + Send,
        P: Serialize + ?Sized + Sync,
    {
        let client = &self.client;
        self.retry
            .run(operation, || async move {
                client
                    .get::<R, _, P>(route, params)
                    .await
                    .map_err(|e| GithubError::from_octocrab(operation, e))
            })
            .await
    }

    /// Fetch every page of a list endpoint, stopping early once `limit` items are known
    async fn get_paginated<R>(
        &self,
        operation: &str,
        route: &str,
        limit: Option<usize>,
        max_pages: u32,
    ) -> GithubResult<Vec<R>>
    where
        R: DeserializeOwned + Send,
    {
        let mut items = Vec::new();
        for page in 1..=max_pages {
            let params = PageParams {
                per_page: PAGE_SIZE,
                page,
            };
            let batch: Vec<R> = self.get_json(operation, route, Some(&params)).await?;
            let last_page = batch.len() < PAGE_SIZE;
            items.extend(batch);

            if limit.is_some_and(|limit| items.len() >= limit) {
                debug!(operation, count = items.len(), "Stopping pagination early");
                break;
            }
            if last_page {
                break;
            }
        }
        Ok(items)
    }
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn decode_content(path: &str, body: ContentResponse) -> GithubResult<Option<String>> {
    let Some(encoded) = body.content else {
        return Ok(None);
    };

    if let Some(encoding) = body.encoding.as_deref() {
        if encoding != "base64" {
            return Err(GithubError::ApiError(format!(
                "Unsupported content encoding {} for {}",
                encoding, path
            )));
        }
    }

    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| GithubError::ApiError(format!("Failed to decode base64 content: {}", e)))?;

    String::from_utf8(decoded)
        .map(Some)
        .map_err(|e| GithubError::ApiError(format!("Failed to decode UTF-8 content: {}", e)))
}

#[async_trait]
impl PrOperations for GithubApiClient {
    async fn list_files(
        &self,
        pr: &PrRef,
        early_exit_threshold: Option<usize>,
    ) -> GithubResult<Vec<FileChange>> {
        let route = format!("/repos/{}/{}/pulls/{}/files", pr.owner, pr.repo, pr.number);
        self.get_paginated("list files", &route, early_exit_threshold, MAX_FILE_PAGES)
            .await
    }

    async fn get_approver_logins(&self, pr: &PrRef) -> GithubResult<HashSet<String>> {
        let route = format!("/repos/{}/{}/pulls/{}/reviews", pr.owner, pr.repo, pr.number);
        let reviews: Vec<Review> = self
            .get_paginated("list reviews", &route, None, u32::MAX)
            .await?;
        Ok(current_approvers(&reviews))
    }

    async fn get_labels(&self, pr: &PrRef) -> GithubResult<Vec<String>> {
        let route = format!("/repos/{}/{}/issues/{}/labels", pr.owner, pr.repo, pr.number);
        let labels: Vec<Label> = self
            .get_paginated("list labels", &route, None, u32::MAX)
            .await?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn add_labels(&self, pr: &PrRef, labels: &[String]) -> GithubResult<()> {
        let route = format!("/repos/{}/{}/issues/{}/labels", pr.owner, pr.repo, pr.number);
        let body = LabelsBody { labels };
        let client = &self.client;
        let route = route.as_str();
        let body = &body;

        self.retry
            .run("add labels", || async move {
                let _: serde_json::Value = client
                    .post(route, Some(body))
                    .await
                    .map_err(|e| GithubError::from_octocrab("add labels", e))?;
                Ok(())
            })
            .await
    }

    async fn remove_label(&self, pr: &PrRef, label: &str) -> GithubResult<()> {
        let route = format!(
            "/repos/{}/{}/issues/{}/labels/{}",
            pr.owner,
            pr.repo,
            pr.number,
            urlencoding::encode(label)
        );
        let client = &self.client;
        let route = route.as_str();

        let result = self
            .retry
            .run("remove label", || async move {
                client
                    .delete::<serde_json::Value, _, ()>(route, None)
                    .await
                    .map(|_| ())
                    .map_err(|e| GithubError::from_octocrab("remove label", e))
            })
            .await;

        match result {
            Err(e) if e.is_not_found() => {
                debug!(pr = %pr, label, "Label already absent");
                Ok(())
            }
            other => other,
        }
    }

    async fn get_pull(&self, pr: &PrRef) -> GithubResult<PullRequest> {
        let route = format!("/repos/{}/{}/pulls/{}", pr.owner, pr.repo, pr.number);
        self.get_json::<_, ()>("get pull", &route, None).await
    }

    async fn get_check_runs_for_ref(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> GithubResult<CheckRunList> {
        let route = format!("/repos/{}/{}/commits/{}/check-runs", owner, repo, sha);
        let mut list = CheckRunList::default();
        for page in 1..=MAX_CHECK_RUN_PAGES {
            let params = PageParams {
                per_page: PAGE_SIZE,
                page,
            };
            let batch: CheckRunList = self
                .get_json("list check runs", &route, Some(&params))
                .await?;
            let last_page = batch.check_runs.len() < PAGE_SIZE;
            list.total_count = batch.total_count;
            list.check_runs.extend(batch.check_runs);

            if last_page || list.is_complete() {
                break;
            }
        }

        if !list.is_complete() {
            warn!(
                sha,
                fetched = list.check_runs.len(),
                total = list.total_count,
                "Check run listing truncated"
            );
        }
        Ok(list)
    }

    async fn get_combined_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> GithubResult<CombinedStatus> {
        let route = format!("/repos/{}/{}/commits/{}/status", owner, repo, sha);
        self.get_json::<_, ()>("get combined status", &route, None)
            .await
    }

    async fn list_open_pulls(&self, owner: &str, repo: &str) -> GithubResult<Vec<PullRequest>> {
        let route = format!("/repos/{}/{}/pulls", owner, repo);
        let params = OpenPullsParams {
            state: "open",
            sort: "updated",
            direction: "desc",
            per_page: PAGE_SIZE,
        };
        self.get_json("list open pulls", &route, Some(&params)).await
    }

    async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> GithubResult<Option<String>> {
        let route = format!("/repos/{}/{}/contents/{}", owner, repo, encode_path(path));
        match self
            .get_json::<ContentResponse, ()>("get file content", &route, None)
            .await
        {
            Ok(body) => decode_content(path, body),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
