//! Integration tests for claim expiry: the sweep requeues abandoned claims
//! and honors anything submitted or merged before it fires.

mod common;

use crate::common::{backdate_review, create_queued_transcript, create_user, TestHarness};
use review_core::config::CoreConfig;
use review_core::domains::reviews::expiry::{expire_review, sweep_expired_reviews};
use review_core::domains::reviews::models::review::Review;
use review_core::domains::transcripts::models::transcript::Transcript;
use review_core::domains::transcripts::workflow::ClaimWorkflow;
use review_core::domains::users::models::user::Permission;
use test_context::test_context;

fn config() -> CoreConfig {
    CoreConfig::default()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn overdue_unsubmitted_claim_is_requeued(ctx: &TestHarness) {
    let user = create_user(Permission::Reviewer, &ctx.db_pool).await;
    let transcript = create_queued_transcript("expiry-overdue", "a b c", &ctx.db_pool).await;

    let wf = ClaimWorkflow::new(ctx.db_pool.clone(), config());
    let (_, review) = wf.claim(transcript.id, user.id).await.expect("claim");

    // Claimed at T0, nothing submitted by T0+24h
    backdate_review(review.id, 25, &ctx.db_pool).await;

    // Another test's sweep may race this one on the shared database; the
    // end state is what matters, not which sweep run got there.
    sweep_expired_reviews(&ctx.db_pool, &config())
        .await
        .expect("sweep");

    let requeued = Transcript::find_by_id(transcript.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(requeued.status, "queued");
    assert_eq!(requeued.claimed_by, None);

    let archived = Review::find_by_id(review.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert!(archived.archived_at.is_some());
    assert!(archived.merged_at.is_none());
    assert!(archived.submitted_at.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn submitted_claim_survives_the_sweep(ctx: &TestHarness) {
    let user = create_user(Permission::Reviewer, &ctx.db_pool).await;
    let transcript = create_queued_transcript("expiry-submitted", "a b c", &ctx.db_pool).await;

    let wf = ClaimWorkflow::new(ctx.db_pool.clone(), config());
    let (_, review) = wf.claim(transcript.id, user.id).await.expect("claim");
    wf.submit(review.id, "https://github.com/example/repo/pull/11")
        .await
        .expect("submit");

    // Submitted at T0+5h, sweep fires after T0+24h: no-op
    backdate_review(review.id, 25, &ctx.db_pool).await;

    sweep_expired_reviews(&ctx.db_pool, &config())
        .await
        .expect("sweep");

    let still_claimed = Transcript::find_by_id(transcript.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still_claimed.status, "not_queued");
    assert_eq!(still_claimed.claimed_by, Some(user.id));

    let untouched = Review::find_by_id(review.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert!(untouched.archived_at.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn fresh_claim_is_left_alone(ctx: &TestHarness) {
    let user = create_user(Permission::Reviewer, &ctx.db_pool).await;
    let transcript = create_queued_transcript("expiry-fresh", "a b c", &ctx.db_pool).await;

    let wf = ClaimWorkflow::new(ctx.db_pool.clone(), config());
    let (_, review) = wf.claim(transcript.id, user.id).await.expect("claim");

    sweep_expired_reviews(&ctx.db_pool, &config())
        .await
        .expect("sweep");

    let untouched = Review::find_by_id(review.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert!(untouched.archived_at.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn expiring_a_review_twice_is_a_noop(ctx: &TestHarness) {
    let user = create_user(Permission::Reviewer, &ctx.db_pool).await;
    let transcript = create_queued_transcript("expiry-idempotent", "a b c", &ctx.db_pool).await;

    let wf = ClaimWorkflow::new(ctx.db_pool.clone(), config());
    let (_, review) = wf.claim(transcript.id, user.id).await.expect("claim");
    backdate_review(review.id, 25, &ctx.db_pool).await;

    expire_review(review.id, &ctx.db_pool).await.expect("first");
    // Second firing finds the review already archived and does nothing
    assert!(!expire_review(review.id, &ctx.db_pool).await.expect("second"));

    let archived = Review::find_by_id(review.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert!(archived.archived_at.is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn requeued_transcript_can_be_claimed_again(ctx: &TestHarness) {
    let alice = create_user(Permission::Reviewer, &ctx.db_pool).await;
    let bob = create_user(Permission::Reviewer, &ctx.db_pool).await;
    let transcript = create_queued_transcript("expiry-reclaim", "a b c", &ctx.db_pool).await;

    let wf = ClaimWorkflow::new(ctx.db_pool.clone(), config());
    let (_, review) = wf.claim(transcript.id, alice.id).await.expect("claim");
    backdate_review(review.id, 25, &ctx.db_pool).await;
    expire_review(review.id, &ctx.db_pool).await.expect("expire");

    let (reclaimed, _) = wf.claim(transcript.id, bob.id).await.expect("reclaim");
    assert_eq!(reclaimed.claimed_by, Some(bob.id));

    // Alice's expired review no longer blocks her either
    let another = create_queued_transcript("expiry-reclaim-2", "x y z", &ctx.db_pool).await;
    wf.claim(another.id, alice.id)
        .await
        .expect("expired review should not count as active");
}
