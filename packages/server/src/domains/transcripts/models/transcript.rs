use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::common::{TranscriptId, UserId};
use crate::domains::transcripts::content::TranscriptContent;

/// Transcript - a document pending or undergoing human review
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transcript {
    pub id: TranscriptId,

    /// Current editable document
    pub content: Json<TranscriptContent>,
    /// Immutable baseline the reward diff is computed against
    pub original_content: Json<TranscriptContent>,
    /// Content-derived dedup key
    pub transcript_hash: String,

    pub status: String, // 'queued', 'not_queued'
    pub claimed_by: Option<UserId>,

    // Archival is a tombstone; rows are never physically deleted
    pub archived_by: Option<UserId>,
    pub archived_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Queue status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptStatus {
    Queued,
    NotQueued,
}

impl std::fmt::Display for TranscriptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptStatus::Queued => write!(f, "queued"),
            TranscriptStatus::NotQueued => write!(f, "not_queued"),
        }
    }
}

impl std::str::FromStr for TranscriptStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "queued" => Ok(TranscriptStatus::Queued),
            "not_queued" => Ok(TranscriptStatus::NotQueued),
            _ => Err(anyhow::anyhow!("Invalid transcript status: {}", s)),
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Transcript {
    /// Find transcript by ID
    pub async fn find_by_id(
        id: TranscriptId,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transcript>("SELECT * FROM transcripts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find transcript by content hash (duplicate detection at ingestion)
    pub async fn find_by_hash(
        transcript_hash: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transcript>(
            "SELECT * FROM transcripts WHERE transcript_hash = $1 LIMIT 1",
        )
        .bind(transcript_hash)
        .fetch_optional(pool)
        .await
    }

    /// List claimable transcripts, newest first
    pub async fn find_queued(
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transcript>(
            r#"
            SELECT * FROM transcripts
            WHERE status = 'queued' AND archived_at IS NULL
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Insert a new queued transcript
    pub async fn create(
        content: &TranscriptContent,
        transcript_hash: &str,
        pool: &PgPool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Transcript>(
            r#"
            INSERT INTO transcripts (id, content, original_content, transcript_hash, status)
            VALUES ($1, $2, $2, $3, 'queued')
            RETURNING *
            "#,
        )
        .bind(TranscriptId::new())
        .bind(Json(content))
        .bind(transcript_hash)
        .fetch_one(pool)
        .await
    }

    /// Atomically claim a queued transcript for a user.
    ///
    /// The status check lives in the WHERE clause so two concurrent claims
    /// cannot both win; returns `None` when the transcript was not claimable
    /// (already claimed, archived, or missing). Runs on a transaction-scoped
    /// connection so the caller can pair it with the review insert.
    pub async fn claim_if_queued(
        id: TranscriptId,
        user_id: UserId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transcript>(
            r#"
            UPDATE transcripts
            SET status = 'not_queued', claimed_by = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'queued' AND archived_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
    }

    /// Put a transcript back in the claim queue and clear its claimant
    pub async fn requeue(id: TranscriptId, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE transcripts
            SET status = 'queued', claimed_by = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Tombstone a transcript (admin operation)
    pub async fn archive(
        id: TranscriptId,
        archived_by: UserId,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transcript>(
            r#"
            UPDATE transcripts
            SET archived_at = NOW(), archived_by = $2, status = 'not_queued', updated_at = NOW()
            WHERE id = $1 AND archived_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(archived_by)
        .fetch_optional(pool)
        .await
    }

    /// Replace the editable document (reviewer saves during a claim)
    pub async fn update_content(
        id: TranscriptId,
        content: &TranscriptContent,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transcript>(
            r#"
            UPDATE transcripts
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(content))
        .fetch_optional(pool)
        .await
    }

    /// True when this transcript can be claimed
    pub fn is_claimable(&self) -> bool {
        self.status == TranscriptStatus::Queued.to_string() && self.archived_at.is_none()
    }
}
