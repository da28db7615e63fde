use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one label evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum LabelOutcome {
    /// Policy disabled for the repository
    Skipped,
    /// Label newly applied
    Labeled,
    /// Label removed because a check failed
    Unlabeled { reason: String },
    /// Label state was already correct
    Noop { labeled: bool },
}

impl LabelOutcome {
    /// Whether the evaluation changed the PR's labels
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Labeled | Self::Unlabeled { .. })
    }
}

impl fmt::Display for LabelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Labeled => write!(f, "labeled"),
            Self::Unlabeled { reason } => write!(f, "unlabeled ({})", reason),
            Self::Noop { labeled } => write!(f, "noop (labeled={})", labeled),
        }
    }
}
