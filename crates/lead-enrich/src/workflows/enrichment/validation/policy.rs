use std::cmp::Ordering;

use super::super::domain::{Candidate, Validity};

/// Outcome of one validity check on one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CheckResult {
    Passed,
    Rejected(String),
    /// The check could not run; the candidate is kept.
    Degraded(String),
}

/// Any rejection excludes the candidate. A degraded check leaves it `Unknown`,
/// which still counts as included.
pub(crate) fn combine(checks: &[CheckResult]) -> Validity {
    if let Some(reason) = checks.iter().find_map(|check| match check {
        CheckResult::Rejected(reason) => Some(reason.clone()),
        _ => None,
    }) {
        return Validity::Invalid { reason };
    }

    if checks
        .iter()
        .any(|check| matches!(check, CheckResult::Degraded(_)))
    {
        Validity::Unknown
    } else {
        Validity::Valid
    }
}

/// `(base_priority desc, role_rank desc, encounter_order asc)`.
pub(crate) fn ranking_order(left: &Candidate, right: &Candidate) -> Ordering {
    right
        .base_priority
        .cmp(&left.base_priority)
        .then_with(|| right.role_rank().cmp(&left.role_rank()))
        .then_with(|| left.encounter_order.cmp(&right.encounter_order))
}
