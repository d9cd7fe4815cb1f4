//! Transcript ingestion from the external content source.
//!
//! Documents arrive from the transcription pipeline; only documents carrying
//! the expected attribution markers are queued, and re-submissions of the
//! same content are dropped by hash.

use sqlx::PgPool;
use tracing::info;

use crate::common::{CoreError, CoreResult};

use super::content::TranscriptContent;
use super::models::transcript::Transcript;

/// Attribution marker stamped by the transcription pipeline.
pub const SUBMITTER_MARKER: &str = "via tstbtc";
/// Attribution marker for documents awaiting human review.
pub const NEEDS_REVIEW_MARKER: &str = "needs review";

/// Validity predicate applied before a document may enter the queue.
pub fn is_reviewable(content: &TranscriptContent) -> bool {
    let attribution = content.transcript_by.to_lowercase();
    attribution.contains(SUBMITTER_MARKER) && attribution.contains(NEEDS_REVIEW_MARKER)
}

/// Queue a new transcript document.
///
/// Rejects documents without a body or without the attribution markers
/// (`Validation`), and documents whose content hash already exists
/// (`Conflict`). Returns the queued transcript row.
pub async fn ingest_transcript(
    content: TranscriptContent,
    pool: &PgPool,
) -> CoreResult<Transcript> {
    if content.body.as_deref().unwrap_or("").trim().is_empty() {
        return Err(CoreError::validation("transcript content has no body"));
    }
    if content.title.trim().is_empty() {
        return Err(CoreError::validation("transcript content has no title"));
    }
    if !is_reviewable(&content) {
        return Err(CoreError::validation(format!(
            "attribution must contain \"{SUBMITTER_MARKER}\" and \"{NEEDS_REVIEW_MARKER}\""
        )));
    }

    let hash = content.transcript_hash();
    if Transcript::find_by_hash(&hash, pool).await?.is_some() {
        return Err(CoreError::conflict(format!(
            "transcript with hash {hash} already exists"
        )));
    }

    // The unique index on transcript_hash closes the race between the
    // check above and the insert; a concurrent duplicate loses here.
    let transcript = match Transcript::create(&content, &hash, pool).await {
        Ok(transcript) => transcript,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(CoreError::conflict(format!(
                "transcript with hash {hash} already exists"
            )));
        }
        Err(e) => return Err(e.into()),
    };
    info!(transcript_id = %transcript.id, title = %content.title, "transcript queued");
    Ok(transcript)
}
