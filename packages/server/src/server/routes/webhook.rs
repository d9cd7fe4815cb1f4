//! Inbound GitHub pull-request webhook.
//!
//! Merged PRs settle the review and credit the reward; PRs closed unmerged
//! requeue the transcript. Unknown actions and PRs with no tracked review
//! are acknowledged without effect so GitHub does not retry them forever.

use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::common::CoreError;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub pull_request: PullRequestPayload,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
    pub html_url: String,
    #[serde(default)]
    pub merged: bool,
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_sats: Option<i64>,
}

pub async fn pull_request_handler(
    Extension(state): Extension<AppState>,
    Json(event): Json<PullRequestEvent>,
) -> Result<(StatusCode, Json<WebhookResponse>), ApiError> {
    if event.action != "closed" {
        return Ok((
            StatusCode::OK,
            Json(WebhookResponse {
                handled: false,
                reward_sats: None,
            }),
        ));
    }

    let pr_url = event.pull_request.html_url.as_str();

    if event.pull_request.merged {
        match state.workflow.handle_pr_merged(&state.ledger, pr_url).await {
            Ok(outcome) => Ok((
                StatusCode::OK,
                Json(WebhookResponse {
                    handled: true,
                    reward_sats: Some(outcome.reward_sats),
                }),
            )),
            // PRs not opened through the marketplace are not ours to settle.
            Err(CoreError::NotFound(_)) => Ok((
                StatusCode::OK,
                Json(WebhookResponse {
                    handled: false,
                    reward_sats: None,
                }),
            )),
            Err(e) => Err(e.into()),
        }
    } else {
        match state.workflow.handle_pr_closed(pr_url).await {
            Ok(_) => Ok((
                StatusCode::OK,
                Json(WebhookResponse {
                    handled: true,
                    reward_sats: None,
                }),
            )),
            Err(CoreError::NotFound(_)) => Ok((
                StatusCode::OK,
                Json(WebhookResponse {
                    handled: false,
                    reward_sats: None,
                }),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
