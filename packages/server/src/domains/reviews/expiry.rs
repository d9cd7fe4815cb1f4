//! Expiry of abandoned claims.
//!
//! Due-ness derives from the persisted `created_at` plus the configured
//! expiry window, so expiry survives process restarts; a periodic sweep
//! (kernel scheduled task) walks the overdue reviews rather than arming an
//! in-memory timer per claim. Firing is idempotent: each review is
//! re-checked under a row lock at fire time, so a claim submitted or merged
//! one second before the sweep is honored.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::common::{CoreResult, ReviewId};
use crate::config::CoreConfig;
use crate::domains::transcripts::models::transcript::Transcript;

use super::models::review::Review;
use super::state::expiry_cutoff;

/// Requeue every transcript whose claim has lapsed. Returns the number of
/// reviews expired.
pub async fn sweep_expired_reviews(pool: &PgPool, config: &CoreConfig) -> CoreResult<usize> {
    let cutoff = expiry_cutoff(Utc::now(), config.expiry_hours);
    let overdue = Review::find_expired_unsubmitted(cutoff, pool).await?;

    let mut expired = 0;
    for review in overdue {
        if expire_review(review.id, pool).await? {
            expired += 1;
        }
    }

    if expired > 0 {
        info!(expired, "expiry sweep requeued abandoned claims");
    }
    Ok(expired)
}

/// Expire a single overdue review: archive it and put its transcript back
/// in the claim queue.
///
/// Reloads the review under a row lock and no-ops (returning `false`) when
/// it was submitted, merged, or archived in the meantime.
pub async fn expire_review(review_id: ReviewId, pool: &PgPool) -> CoreResult<bool> {
    let mut tx = pool.begin().await?;

    let review = match Review::lock_by_id(review_id, &mut tx).await? {
        Some(review) => review,
        None => return Ok(false),
    };

    if review.submitted_at.is_some() || review.merged_at.is_some() || review.archived_at.is_some()
    {
        debug!(%review_id, "claim honored before expiry, leaving as-is");
        return Ok(false);
    }

    Review::archive(review_id, &mut tx).await?;
    Transcript::requeue(review.transcript_id, &mut tx).await?;

    tx.commit().await?;
    info!(%review_id, transcript_id = %review.transcript_id, "claim expired, transcript requeued");
    Ok(true)
}
