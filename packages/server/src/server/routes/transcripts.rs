//! Transcript queue and claim API.

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::{CoreError, ReviewId, TranscriptId};
use crate::domains::reviews::models::review::Review;
use crate::domains::transcripts::content::TranscriptContent;
use crate::domains::transcripts::ingest::ingest_transcript;
use crate::domains::transcripts::models::transcript::Transcript;
use crate::server::app::AppState;
use crate::server::auth::AuthedUser;
use crate::server::error::ApiError;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// List claimable transcripts
pub async fn list_queued_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Transcript>>, ApiError> {
    let transcripts =
        Transcript::find_queued(query.limit.clamp(1, 100), query.offset.max(0), &state.db_pool)
            .await?;
    Ok(Json(transcripts))
}

/// Ingest a new transcript document (content-ingestion adapter)
pub async fn ingest_handler(
    Extension(state): Extension<AppState>,
    Json(content): Json<TranscriptContent>,
) -> Result<(StatusCode, Json<Transcript>), ApiError> {
    let transcript = ingest_transcript(content, &state.db_pool).await?;
    Ok((StatusCode::CREATED, Json(transcript)))
}

#[derive(Serialize)]
pub struct ClaimResponse {
    pub transcript: Transcript,
    pub review: Review,
}

/// Claim a queued transcript for the calling user
pub async fn claim_handler(
    Extension(state): Extension<AppState>,
    AuthedUser(user_id): AuthedUser,
    Path(transcript_id): Path<TranscriptId>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let (transcript, review) = state.workflow.claim(transcript_id, user_id).await?;
    Ok(Json(ClaimResponse { transcript, review }))
}

/// Archive a transcript (admin only)
pub async fn archive_handler(
    Extension(state): Extension<AppState>,
    AuthedUser(user_id): AuthedUser,
    Path(transcript_id): Path<TranscriptId>,
) -> Result<Json<Transcript>, ApiError> {
    let transcript = state.workflow.archive(transcript_id, user_id).await?;
    Ok(Json(transcript))
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub pr_url: Option<String>,
}

/// Attach an opened PR to the caller's review
pub async fn submit_handler(
    Extension(state): Extension<AppState>,
    AuthedUser(user_id): AuthedUser,
    Path(review_id): Path<ReviewId>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<Review>, ApiError> {
    let pr_url = request.pr_url.unwrap_or_default();

    // Ownership check before the mutation runs
    let review = Review::find_by_id(review_id, &state.db_pool)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("review {review_id}")))?;
    if review.user_id != user_id {
        return Err(ApiError(CoreError::PermissionDenied(
            "review belongs to another user".to_string(),
        )));
    }

    let review = state.workflow.submit(review_id, &pr_url).await?;
    Ok(Json(review))
}
