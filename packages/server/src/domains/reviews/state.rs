//! Review lifecycle classification.
//!
//! A review moves open → submitted → {merged | expired-archived}. Callers
//! filter large collections server-side, so each state doubles as a SQL
//! predicate builder; `classify` is the in-memory twin used by the expiry
//! sweep and by tests.

use chrono::{DateTime, Duration, Utc};

use super::models::review::Review;

/// Lifecycle state of a review at a given instant.
///
/// `Active`, `Pending` and `Inactive` partition the space; `Merged` is the
/// documented subset of `Inactive` where the claim ended in a merged PR
/// (both `merged_at` and `archived_at` set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    /// Claimed within the expiry window, nothing submitted yet.
    Active,
    /// Submitted, awaiting a merge decision. Never ages out.
    Pending,
    /// Terminal (merged or archived) or aged out without a submission.
    Inactive,
    /// Terminal success: merged and archived.
    Merged,
}

impl ReviewState {
    /// SQL predicate over the `reviews` columns for this state.
    ///
    /// `cutoff_param` is the placeholder for the expiry cutoff
    /// (`now - expiry_hours`); only used when [`uses_cutoff`] is true, and
    /// callers must bind it only in that case.
    ///
    /// [`uses_cutoff`]: ReviewState::uses_cutoff
    pub fn predicate(&self, cutoff_param: &str) -> String {
        match self {
            ReviewState::Active => format!(
                "created_at >= {cutoff_param} AND merged_at IS NULL \
                 AND archived_at IS NULL AND submitted_at IS NULL"
            ),
            ReviewState::Pending => {
                "submitted_at IS NOT NULL AND merged_at IS NULL AND archived_at IS NULL"
                    .to_string()
            }
            ReviewState::Inactive => format!(
                "(merged_at IS NOT NULL OR archived_at IS NOT NULL) \
                 OR (created_at < {cutoff_param} AND submitted_at IS NULL)"
            ),
            ReviewState::Merged => {
                "merged_at IS NOT NULL AND archived_at IS NOT NULL".to_string()
            }
        }
    }

    /// Whether [`predicate`](ReviewState::predicate) references the cutoff
    /// placeholder.
    pub fn uses_cutoff(&self) -> bool {
        matches!(self, ReviewState::Active | ReviewState::Inactive)
    }
}

/// Expiry cutoff for the given reference time.
pub fn expiry_cutoff(now: DateTime<Utc>, expiry_hours: i64) -> DateTime<Utc> {
    now - Duration::hours(expiry_hours)
}

/// Classify a review into exactly one of {Active, Pending, Inactive, Merged}.
///
/// `Merged` takes precedence over the broader `Inactive` it is a subset of.
pub fn classify(review: &Review, now: DateTime<Utc>, expiry_hours: i64) -> ReviewState {
    if review.merged_at.is_some() && review.archived_at.is_some() {
        return ReviewState::Merged;
    }
    if review.merged_at.is_some() || review.archived_at.is_some() {
        return ReviewState::Inactive;
    }
    if review.submitted_at.is_some() {
        return ReviewState::Pending;
    }
    if review.created_at >= expiry_cutoff(now, expiry_hours) {
        ReviewState::Active
    } else {
        ReviewState::Inactive
    }
}
