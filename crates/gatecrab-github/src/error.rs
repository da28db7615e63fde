use gatecrab_core::FailureSignal;
use std::error::Error as StdError;
use std::io::ErrorKind;
use thiserror::Error;

/// GitHub crate error types
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    #[error("GitHub API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Transport error ({code}): {message}")]
    Transport { code: &'static str, message: String },

    #[error("GitHub API error: {0}")]
    ApiError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GithubError {
    /// Classify an octocrab failure, keeping the HTTP status or transport
    /// code so retry decisions can be made on it
    pub fn from_octocrab(context: &str, err: octocrab::Error) -> Self {
        if let octocrab::Error::GitHub { source, .. } = &err {
            return GithubError::Http {
                status: source.status_code.as_u16(),
                message: format!("{}: {}", context, source.message),
            };
        }

        match transport_code(&err) {
            Some(code) => GithubError::Transport {
                code,
                message: format!("{}: {}", context, err),
            },
            None => GithubError::ApiError(format!("{}: {}", context, err)),
        }
    }

    /// HTTP 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, GithubError::Http { status: 404, .. })
    }
}

impl FailureSignal for GithubError {
    fn code(&self) -> Option<&str> {
        match self {
            GithubError::Transport { code, .. } => Some(*code),
            _ => None,
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            GithubError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Walk the source chain looking for a network-level failure
fn transport_code(err: &(dyn StdError + 'static)) -> Option<&'static str> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            match io.kind() {
                ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => return Some("ECONNRESET"),
                ErrorKind::TimedOut => return Some("ETIMEDOUT"),
                ErrorKind::ConnectionRefused => return Some("ECONNREFUSED"),
                ErrorKind::BrokenPipe => return Some("EPIPE"),
                _ => {}
            }
        }

        let text = e.to_string().to_lowercase();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            if text.contains("temporary failure") || text.contains("try again") {
                return Some("EAI_AGAIN");
            }
            return Some("ENOTFOUND");
        }
        if text.contains("timed out") {
            return Some("ETIMEDOUT");
        }

        current = e.source();
    }
    None
}

pub type GithubResult<T> = Result<T, GithubError>;
