pub mod approvals;
pub mod checks;
pub mod config;
pub mod error;
pub mod files;
pub mod labels;
pub mod outcome;
pub mod pr;
pub mod transient;

// Re-export commonly used types
pub use approvals::{insufficient_approvals_reason, trusted_approval_count};
pub use checks::{
    CheckConclusion, CheckRun, CheckStatus, CombinedStatus, StatusState, checks_failed_reason,
    ci_passing,
};
pub use config::{AutomergePolicy, LabelNames, ReadinessPolicy, RepoPolicy, ServerConfig};
pub use error::{CoreError, CoreResult};
pub use files::{Classification, PathRules, classify_files, is_file_allowed};
pub use labels::{AUTOMERGE_LABEL, MERGE_READY_LABEL, has_label, is_label_match};
pub use outcome::LabelOutcome;
pub use pr::{FileChange, FileStatus, PrRef};
pub use transient::{FailureSignal, TRANSIENT_CODES, is_transient_error};
