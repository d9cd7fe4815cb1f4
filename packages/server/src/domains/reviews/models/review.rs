use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{ReviewId, TranscriptId, UserId};
use crate::domains::reviews::state::{expiry_cutoff, ReviewState};

/// Review - one user's claimed editing episode over a transcript
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub transcript_id: TranscriptId,

    pub pr_url: Option<String>,

    /// PR opened
    pub submitted_at: Option<DateTime<Utc>>,
    /// PR merged
    pub merged_at: Option<DateTime<Utc>>,
    /// Terminal: merged-and-closed, or expired/requeued
    pub archived_at: Option<DateTime<Utc>>,

    /// Claim time; the expiry deadline derives from this
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Review {
    /// Find review by ID
    pub async fn find_by_id(id: ReviewId, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a review under a row lock (expiry sweep re-check)
    pub async fn lock_by_id(
        id: ReviewId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find the review tied to a PR (webhook dispatch)
    pub async fn find_by_pr_url(pr_url: &str, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE pr_url = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(pr_url)
        .fetch_optional(pool)
        .await
    }

    /// Insert a review at claim time, on the claim transaction's connection
    pub async fn create(
        user_id: UserId,
        transcript_id: TranscriptId,
        conn: &mut PgConnection,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, user_id, transcript_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(ReviewId::new())
        .bind(user_id)
        .bind(transcript_id)
        .fetch_one(conn)
        .await
    }

    /// Count a user's reviews in a lifecycle state, server-side.
    ///
    /// Runs on a transaction-scoped connection so the claim workflow can make
    /// "count + insert" one atomic unit per user.
    pub async fn count_for_user(
        user_id: UserId,
        state: ReviewState,
        now: DateTime<Utc>,
        expiry_hours: i64,
        conn: &mut PgConnection,
    ) -> Result<i64, sqlx::Error> {
        let sql = format!(
            "SELECT COUNT(*) FROM reviews WHERE user_id = $1 AND ({})",
            state.predicate("$2")
        );
        let query = sqlx::query_scalar::<_, i64>(&sql).bind(user_id);
        let query = if state.uses_cutoff() {
            query.bind(expiry_cutoff(now, expiry_hours))
        } else {
            query
        };
        query.fetch_one(conn).await
    }

    /// List a user's reviews in a lifecycle state, newest first
    pub async fn find_for_user(
        user_id: UserId,
        state: ReviewState,
        now: DateTime<Utc>,
        expiry_hours: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT * FROM reviews WHERE user_id = $1 AND ({}) ORDER BY created_at DESC",
            state.predicate("$2")
        );
        let query = sqlx::query_as::<_, Review>(&sql).bind(user_id);
        let query = if state.uses_cutoff() {
            query.bind(expiry_cutoff(now, expiry_hours))
        } else {
            query
        };
        query.fetch_all(pool).await
    }

    /// Reviews whose claim has lapsed: past the cutoff with no submission,
    /// no merge, and not yet archived. The expiry sweep feeds on this.
    pub async fn find_expired_unsubmitted(
        cutoff: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE created_at < $1
              AND submitted_at IS NULL
              AND merged_at IS NULL
              AND archived_at IS NULL
            "#,
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }

    /// Record a PR submission against the claim
    pub async fn submit(
        id: ReviewId,
        pr_url: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET submitted_at = NOW(), pr_url = $2, updated_at = NOW()
            WHERE id = $1 AND archived_at IS NULL AND merged_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(pr_url)
        .fetch_optional(pool)
        .await
    }

    /// Terminal success: PR merged. Sets both merged_at and archived_at.
    pub async fn mark_merged(
        id: ReviewId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET merged_at = NOW(), archived_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND merged_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Archive a review without a merge (expiry, or PR closed unmerged).
    ///
    /// Leaves `merged_at` and `submitted_at` untouched so an expired claim
    /// stays distinguishable from a merged one.
    pub async fn archive(
        id: ReviewId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET archived_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND archived_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }
}
