use crate::types::Review;
use std::collections::{HashMap, HashSet};

/// Reduce a PR's review history to the logins currently approving it
///
/// Each reviewer's latest state-changing review decides their standing.
/// `APPROVED` approves, `CHANGES_REQUESTED` and `DISMISSED` revoke.
/// `COMMENTED` and `PENDING` reviews leave the previous standing untouched.
/// Reviews without a submission time sort first; ties keep listing order.
pub fn current_approvers(reviews: &[Review]) -> HashSet<String> {
    let mut ordered: Vec<&Review> = reviews.iter().collect();
    ordered.sort_by_key(|r| r.submitted_at);

    let mut standing: HashMap<String, bool> = HashMap::new();
    for review in ordered {
        let Some(user) = &review.user else {
            continue;
        };

        let approves = match review.state.to_ascii_uppercase().as_str() {
            "APPROVED" => true,
            "CHANGES_REQUESTED" | "DISMISSED" => false,
            _ => continue,
        };
        standing.insert(user.login.clone(), approves);
    }

    standing
        .into_iter()
        .filter_map(|(login, approves)| approves.then_some(login))
        .collect()
}
