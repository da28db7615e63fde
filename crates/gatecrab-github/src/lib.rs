pub mod api;
pub mod error;
pub mod ops;
pub mod retry;
pub mod reviews;
pub mod types;
pub mod webhook;

// Re-export commonly used types
pub use api::GithubApiClient;
pub use error::{GithubError, GithubResult};
pub use ops::PrOperations;
pub use retry::RetryPolicy;
pub use reviews::current_approvers;
pub use types::{
    CheckPullRequest, CheckRunEvent, CheckRunList, CheckSuiteEvent, CheckTarget, CommitRef, Label,
    PullRequest, PullRequestEvent, PullRequestReviewEvent, PushCommit, PushEvent, Repository,
    Review, StatusEvent, User,
};
pub use webhook::{
    SIGNATURE_HEADER, WebhookSecret, parse_signature, sign_body, verify_signature,
    verify_signature_header,
};
