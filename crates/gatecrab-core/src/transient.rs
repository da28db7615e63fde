//! Retryable-versus-permanent failure classification.

use serde_json::Value;

/// Transport-level failure codes worth retrying
pub const TRANSIENT_CODES: [&str; 6] = [
    "ECONNRESET",
    "ETIMEDOUT",
    "ECONNREFUSED",
    "ENOTFOUND",
    "EAI_AGAIN",
    "EPIPE",
];

/// Failure shape inspected by [`is_transient_error`]
///
/// Both accessors default to `None`, so any error type can opt in and
/// expose only what it knows.
pub trait FailureSignal {
    /// Transport failure code such as `ECONNRESET`
    fn code(&self) -> Option<&str> {
        None
    }

    /// HTTP status returned by the remote API
    fn status(&self) -> Option<u16> {
        None
    }
}

/// Decide whether a failure is worth retrying
///
/// True for the codes in [`TRANSIENT_CODES`], otherwise for HTTP 429 or any
/// status >= 500. Everything else, including every other 4xx, is permanent.
pub fn is_transient_error<E: FailureSignal + ?Sized>(err: &E) -> bool {
    if let Some(code) = err.code() {
        if TRANSIENT_CODES.contains(&code) {
            return true;
        }
    }

    matches!(err.status(), Some(status) if status == 429 || status >= 500)
}

/// Error payloads as decoded JSON
///
/// `code` must be a string and `status` an integer; `null`, primitives and
/// arrays carry neither.
impl FailureSignal for Value {
    fn code(&self) -> Option<&str> {
        self.get("code").and_then(Value::as_str)
    }

    fn status(&self) -> Option<u16> {
        self.get("status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
    }
}
