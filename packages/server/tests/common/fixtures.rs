//! Shared fixtures: users, transcripts, and a Lightning test double.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use review_core::common::{ReviewId, TranscriptId, UserId};
use review_core::domains::transcripts::content::TranscriptContent;
use review_core::domains::transcripts::models::transcript::Transcript;
use review_core::domains::users::models::user::{Permission, User};
use review_core::kernel::lightning::{LightningClient, PaymentReceipt};

/// Create a user (with wallet) under a unique GitHub username.
pub async fn create_user(permissions: Permission, pool: &PgPool) -> User {
    let username = format!("user-{}", uuid::Uuid::new_v4());
    User::create(&username, None, permissions, pool)
        .await
        .expect("Failed to create user")
}

/// Create a user row with no wallet (legacy account shape).
pub async fn create_user_without_wallet(pool: &PgPool) -> UserId {
    let user_id = UserId::new();
    sqlx::query("INSERT INTO users (id, github_username, permissions) VALUES ($1, $2, 'reviewer')")
        .bind(user_id)
        .bind(format!("walletless-{}", user_id))
        .execute(pool)
        .await
        .expect("Failed to create user without wallet");
    user_id
}

/// A reviewable transcript document.
pub fn reviewable_content(title: &str, body: &str) -> TranscriptContent {
    TranscriptContent {
        title: title.to_string(),
        body: Some(body.to_string()),
        transcript_by: "fixture via tstbtc -- needs review".to_string(),
        speakers: vec!["speaker-a".to_string()],
        categories: vec!["conference".to_string()],
        ..Default::default()
    }
}

/// Insert a queued transcript directly via the model.
pub async fn create_queued_transcript(title: &str, body: &str, pool: &PgPool) -> Transcript {
    let content = reviewable_content(title, body);
    let hash = content.transcript_hash();
    Transcript::create(&content, &hash, pool)
        .await
        .expect("Failed to create transcript")
}

/// Backdate a review's claim time so the expiry sweep sees it as overdue.
pub async fn backdate_review(review_id: ReviewId, hours: i64, pool: &PgPool) {
    sqlx::query("UPDATE reviews SET created_at = NOW() - make_interval(hours => $2::int) WHERE id = $1")
        .bind(review_id)
        .bind(hours)
        .execute(pool)
        .await
        .expect("Failed to backdate review");
}

/// Replace a transcript's editable content, leaving the baseline untouched.
pub async fn edit_transcript_body(transcript_id: TranscriptId, body: &str, pool: &PgPool) {
    let transcript = Transcript::find_by_id(transcript_id, pool)
        .await
        .expect("Failed to load transcript")
        .expect("Transcript missing");
    let mut content = transcript.content.0.clone();
    content.body = Some(body.to_string());
    Transcript::update_content(transcript_id, &content, pool)
        .await
        .expect("Failed to update content");
}

/// Lightning double that settles every invoice and counts calls.
#[derive(Default)]
pub struct SettlingLightning {
    pub calls: AtomicUsize,
}

#[async_trait]
impl LightningClient for SettlingLightning {
    async fn pay_invoice(&self, _invoice: &str, _amount_sats: i64) -> Result<PaymentReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentReceipt {
            provider_id: "test-withdrawal".to_string(),
            fee_sats: 1,
        })
    }
}

/// Lightning double that rejects every invoice.
#[derive(Default)]
pub struct RejectingLightning {
    pub calls: AtomicUsize,
}

#[async_trait]
impl LightningClient for RejectingLightning {
    async fn pay_invoice(&self, _invoice: &str, _amount_sats: i64) -> Result<PaymentReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("route not found")
    }
}
