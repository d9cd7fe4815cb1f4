//! Claim/submit/archive/requeue transitions on Transcript + Review pairs.
//!
//! Every operation is one database transaction: a precondition failure
//! leaves no partial state behind. The per-user concurrency checks and the
//! review insert run under a row lock on the user so two concurrent claims
//! cannot both pass the precondition read.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use crate::common::{CoreError, CoreResult, ReviewId, TranscriptId, UserId};
use crate::config::CoreConfig;
use crate::domains::ledger::manager::LedgerManager;
use crate::domains::ledger::models::transaction::Transaction;
use crate::domains::reviews::models::review::Review;
use crate::domains::reviews::state::ReviewState;
use crate::domains::users::models::user::User;

use super::diff::compute_diff_stats;
use super::models::transcript::Transcript;
use super::reward::calculate_reward;

/// Result of a merged PR: the terminal review plus the credited reward.
#[derive(Debug)]
pub struct MergeOutcome {
    pub review: Review,
    pub reward_sats: i64,
    pub transaction: Transaction,
}

/// Orchestrates the transcript claim state machine:
/// `queued → not_queued (claimed) → {archived | queued (requeued)}`.
#[derive(Clone)]
pub struct ClaimWorkflow {
    pool: PgPool,
    config: CoreConfig,
}

impl ClaimWorkflow {
    pub fn new(pool: PgPool, config: CoreConfig) -> Self {
        Self { pool, config }
    }

    /// Claim a queued transcript for a user.
    ///
    /// Rejects with `Conflict` when the user already holds an active review,
    /// when their pending (submitted, unmerged) count is at the limit, or
    /// when the transcript is not claimable. On success the transcript is
    /// `not_queued`, stamped with the claimant, and a fresh review row
    /// exists — all or nothing.
    pub async fn claim(
        &self,
        transcript_id: TranscriptId,
        user_id: UserId,
    ) -> CoreResult<(Transcript, Review)> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the user serializes concurrent claims by the same
        // user, making count-then-insert atomic.
        let user_exists: Option<UserId> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if user_exists.is_none() {
            return Err(CoreError::not_found(format!("user {user_id}")));
        }

        let now = Utc::now();
        let active = Review::count_for_user(
            user_id,
            ReviewState::Active,
            now,
            self.config.expiry_hours,
            &mut tx,
        )
        .await?;
        if active > 0 {
            return Err(CoreError::conflict(
                "user already has an active review in progress",
            ));
        }

        let pending = Review::count_for_user(
            user_id,
            ReviewState::Pending,
            now,
            self.config.expiry_hours,
            &mut tx,
        )
        .await?;
        if pending >= self.config.max_pending_reviews {
            return Err(CoreError::conflict(format!(
                "user has {pending} reviews awaiting merge (limit {})",
                self.config.max_pending_reviews
            )));
        }

        let transcript = Transcript::claim_if_queued(transcript_id, user_id, &mut tx)
            .await?
            .ok_or_else(|| {
                CoreError::conflict("transcript is not claimable (claimed, archived, or missing)")
            })?;

        let review = Review::create(user_id, transcript_id, &mut tx).await?;

        tx.commit().await?;
        info!(%transcript_id, %user_id, review_id = %review.id, "transcript claimed");
        Ok((transcript, review))
    }

    /// Record a PR submission against a review.
    pub async fn submit(&self, review_id: ReviewId, pr_url: &str) -> CoreResult<Review> {
        if pr_url.trim().is_empty() {
            return Err(CoreError::validation("pr_url is required"));
        }

        let review = Review::submit(review_id, pr_url, &self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("open review {review_id}")))?;

        info!(%review_id, pr_url, "review submitted");
        Ok(review)
    }

    /// Tombstone a transcript. Admin only.
    pub async fn archive(
        &self,
        transcript_id: TranscriptId,
        archived_by: UserId,
    ) -> CoreResult<Transcript> {
        let user = User::find_by_id(archived_by, &self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("user {archived_by}")))?;
        if !user.is_admin() {
            return Err(CoreError::PermissionDenied(
                "archiving transcripts requires admin permissions".to_string(),
            ));
        }

        let transcript = Transcript::archive(transcript_id, archived_by, &self.pool)
            .await?
            .ok_or_else(|| {
                CoreError::not_found(format!("unarchived transcript {transcript_id}"))
            })?;

        info!(%transcript_id, %archived_by, "transcript archived");
        Ok(transcript)
    }

    /// PR merged: terminal success for the review. The transcript stays
    /// `not_queued` (the merged edit supersedes the queue entry).
    pub async fn complete_merge(&self, review_id: ReviewId) -> CoreResult<Review> {
        let mut tx = self.pool.begin().await?;

        let review = Review::mark_merged(review_id, &mut tx)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("unmerged review {review_id}")))?;

        tx.commit().await?;
        info!(%review_id, "review merged");
        Ok(review)
    }

    /// Webhook entry point for a merged PR: mark the review merged, size the
    /// reward from the word diff against the original content, and credit
    /// the reviewer's wallet.
    ///
    /// The merge transition and the credit are separate transactions; a
    /// credit failure leaves the review merged with a compensating failed
    /// ledger row, and the error surfaces to the webhook caller for retry.
    pub async fn handle_pr_merged(
        &self,
        ledger: &LedgerManager,
        pr_url: &str,
    ) -> CoreResult<MergeOutcome> {
        let review = Review::find_by_pr_url(pr_url, &self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("review for PR {pr_url}")))?;

        let transcript = Transcript::find_by_id(review.transcript_id, &self.pool)
            .await?
            .ok_or_else(|| {
                CoreError::not_found(format!("transcript {}", review.transcript_id))
            })?;

        let review = self.complete_merge(review.id).await?;

        let stats = compute_diff_stats(&transcript.original_content, &transcript.content)?;
        let reward_sats = calculate_reward(&stats, self.config.reward_rate);

        let transaction = ledger.create_credit(&review, reward_sats).await?;

        info!(
            review_id = %review.id,
            reward_sats,
            total_words = stats.total_words,
            diff_words = stats.total_diff_words,
            "merged PR rewarded"
        );
        Ok(MergeOutcome {
            review,
            reward_sats,
            transaction,
        })
    }

    /// Webhook entry point for a PR closed without a merge.
    pub async fn handle_pr_closed(&self, pr_url: &str) -> CoreResult<Review> {
        let review = Review::find_by_pr_url(pr_url, &self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("review for PR {pr_url}")))?;
        self.close_unmerged(review.id).await
    }

    /// PR closed without a merge: archive the review and put the transcript
    /// back in the claim queue.
    pub async fn close_unmerged(&self, review_id: ReviewId) -> CoreResult<Review> {
        let mut tx = self.pool.begin().await?;

        let review = Review::archive(review_id, &mut tx)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("open review {review_id}")))?;
        Transcript::requeue(review.transcript_id, &mut tx).await?;

        tx.commit().await?;
        info!(%review_id, transcript_id = %review.transcript_id, "review closed unmerged, transcript requeued");
        Ok(review)
    }
}
