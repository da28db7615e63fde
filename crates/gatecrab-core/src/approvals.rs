use std::collections::HashSet;

/// Count trusted reviewers among the current approvers
///
/// Logins compare case-insensitively and each trusted reviewer counts at
/// most once. `approvers` must already exclude stale or dismissed
/// approvals.
///
/// # Examples
///
/// ```
/// use gatecrab_core::approvals::trusted_approval_count;
///
/// let approvers = ["alice", "mallory"];
/// let trusted = ["Alice", "bob"];
/// assert_eq!(trusted_approval_count(&approvers, &trusted), 1);
/// ```
pub fn trusted_approval_count<A, T>(approvers: A, trusted: T) -> usize
where
    A: IntoIterator,
    A::Item: AsRef<str>,
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let approvers: HashSet<String> = approvers
        .into_iter()
        .map(|login| login.as_ref().to_lowercase())
        .collect();

    trusted
        .into_iter()
        .map(|login| login.as_ref().to_lowercase())
        .collect::<HashSet<_>>()
        .intersection(&approvers)
        .count()
}

/// Reason string used when approvals fall short
pub fn insufficient_approvals_reason(have: usize, need: usize) -> String {
    format!("insufficient approvals: {}/{}", have, need)
}
