/// Label applied when a PR passes the automerge policy
pub const AUTOMERGE_LABEL: &str = "automerge";

/// Label applied when a PR passes the merge-readiness policy
pub const MERGE_READY_LABEL: &str = "merge-ready";

/// Check whether `label` refers to `target`
///
/// Matches exactly, or as a prefix followed by `:` or `/` so that scoped
/// variants such as `automerge:squash` count as the same label. Comparison
/// is case-insensitive, as GitHub label names are.
///
/// # Examples
///
/// ```
/// use gatecrab_core::labels::is_label_match;
///
/// assert!(is_label_match("automerge", "automerge"));
/// assert!(is_label_match("AutoMerge:squash", "automerge"));
/// assert!(!is_label_match("automerge-later", "automerge"));
/// ```
pub fn is_label_match(label: &str, target: &str) -> bool {
    if label.eq_ignore_ascii_case(target) {
        return true;
    }

    label.len() > target.len()
        && label.is_char_boundary(target.len())
        && label[..target.len()].eq_ignore_ascii_case(target)
        && matches!(label.as_bytes()[target.len()], b':' | b'/')
}

/// True if any label in `labels` matches `target`
pub fn has_label<S: AsRef<str>>(labels: &[S], target: &str) -> bool {
    labels.iter().any(|l| is_label_match(l.as_ref(), target))
}
