//! File-change classification for the automerge policy.
//!
//! Deny and allow patterns live in two separate glob sets. A path is
//! rejected as soon as any deny pattern matches; allow patterns are only
//! consulted afterwards.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::config::AutomergePolicy;
use crate::error::{CoreError, CoreResult};
use crate::pr::FileChange;

/// Verdict of a classification step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub eligible: bool,
    pub reason: String,
}

impl Classification {
    pub fn eligible(reason: impl Into<String>) -> Self {
        Self {
            eligible: true,
            reason: reason.into(),
        }
    }

    pub fn ineligible(reason: impl Into<String>) -> Self {
        Self {
            eligible: false,
            reason: reason.into(),
        }
    }
}

/// Compiled allow/deny path rules
#[derive(Debug, Clone)]
pub struct PathRules {
    allow: GlobSet,
    deny: GlobSet,
}

impl PathRules {
    /// Compile both pattern lists
    ///
    /// `*` does not cross `/`; `**` matches any number of directories.
    pub fn new<S: AsRef<str>>(allowed: &[S], denied: &[S]) -> CoreResult<Self> {
        Ok(Self {
            allow: build_set(allowed)?,
            deny: build_set(denied)?,
        })
    }

    pub fn is_denied(&self, path: &str) -> bool {
        self.deny.is_match(path)
    }

    pub fn is_allowed(&self, path: &str) -> bool {
        if self.is_denied(path) {
            return false;
        }
        self.allow.is_match(path)
    }
}

fn compile(pattern: &str) -> CoreResult<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| CoreError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })
}

fn build_set<S: AsRef<str>>(patterns: &[S]) -> CoreResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(compile(pattern.as_ref())?);
    }
    builder
        .build()
        .map_err(|e| CoreError::InvalidConfig(format!("path pattern set failed to build: {}", e)))
}

/// Check a single path against allow/deny patterns
///
/// Deny wins over allow. An empty allow list allows nothing.
///
/// # Examples
///
/// ```
/// use gatecrab_core::files::is_file_allowed;
///
/// let allow = vec!["**/*.md".to_string()];
/// let deny = vec![".github/**".to_string()];
///
/// assert!(is_file_allowed("docs/guide.md", &allow, &deny).unwrap());
/// assert!(!is_file_allowed(".github/PULL_REQUEST_TEMPLATE.md", &allow, &deny).unwrap());
/// assert!(!is_file_allowed("src/main.rs", &allow, &deny).unwrap());
/// ```
pub fn is_file_allowed<S: AsRef<str>>(
    filename: &str,
    allowed_paths: &[S],
    deny_paths: &[S],
) -> CoreResult<bool> {
    Ok(PathRules::new(allowed_paths, deny_paths)?.is_allowed(filename))
}

/// Classify a PR's changed files against the automerge policy
///
/// Checks run in a fixed order and stop at the first failure: empty diff,
/// file count, changed-line total, then per-file path rules (renames must
/// pass under both names). Errors only on invalid glob patterns.
pub fn classify_files(files: &[FileChange], policy: &AutomergePolicy) -> CoreResult<Classification> {
    if files.is_empty() {
        return Ok(Classification::ineligible("no files changed"));
    }

    if files.len() > policy.max_files {
        return Ok(Classification::ineligible(format!(
            "too many files: {} > {}",
            files.len(),
            policy.max_files
        )));
    }

    let total_lines: u64 = files.iter().map(FileChange::changed_lines).sum();
    if total_lines > policy.max_changed_lines {
        return Ok(Classification::ineligible(format!(
            "too many changed lines: {} > {}",
            total_lines, policy.max_changed_lines
        )));
    }

    let rules = PathRules::new(&policy.allowed_paths, &policy.deny_paths)?;
    for file in files {
        if !rules.is_allowed(&file.filename) {
            return Ok(Classification::ineligible(format!(
                "file not allowed by path policy: {}",
                file.filename
            )));
        }

        if let Some(previous) = &file.previous_filename {
            if !rules.is_allowed(previous) {
                return Ok(Classification::ineligible(format!(
                    "renamed file not allowed by path policy: {} -> {} (rename source {} is not allowed)",
                    previous, file.filename, previous
                )));
            }
        }
    }

    Ok(Classification::eligible(format!(
        "all {} files ({} changed lines) within policy",
        files.len(),
        total_lines
    )))
}
