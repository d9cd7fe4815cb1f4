//! End-to-end flow for a merged PR: claim → edit → submit → merge webhook
//! semantics → diff-sized reward credited to the reviewer's wallet.

mod common;

use crate::common::{
    create_queued_transcript, create_user, edit_transcript_body, TestHarness,
};
use review_core::common::CoreError;
use review_core::config::CoreConfig;
use review_core::domains::ledger::manager::LedgerManager;
use review_core::domains::ledger::models::wallet::Wallet;
use review_core::domains::transcripts::workflow::ClaimWorkflow;
use review_core::domains::users::models::user::Permission;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn merged_pr_credits_the_diff_sized_reward(ctx: &TestHarness) {
    let user = create_user(Permission::Reviewer, &ctx.db_pool).await;
    // 3-word baseline body
    let transcript = create_queued_transcript("merge-reward", "a b c", &ctx.db_pool).await;

    let config = CoreConfig::default();
    let wf = ClaimWorkflow::new(ctx.db_pool.clone(), config);
    let ledger = LedgerManager::new(ctx.db_pool.clone());

    let (_, review) = wf.claim(transcript.id, user.id).await.expect("claim");
    // Reviewer adds one word
    edit_transcript_body(transcript.id, "a b c d", &ctx.db_pool).await;
    wf.submit(review.id, "https://github.com/example/repo/pull/42")
        .await
        .expect("submit");

    let outcome = wf
        .handle_pr_merged(&ledger, "https://github.com/example/repo/pull/42")
        .await
        .expect("merge");

    // total_words=4, total_diff_words=1, rate=0.5 → round(2.5) = 3
    assert_eq!(outcome.reward_sats, 3);
    assert!(outcome.review.merged_at.is_some());
    assert!(outcome.review.archived_at.is_some());
    assert_eq!(outcome.transaction.amount, 3);
    assert_eq!(outcome.transaction.transaction_status, "success");

    let wallet = Wallet::find_by_user(user.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.balance, 3);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn merged_pr_for_an_untracked_url_is_not_found(ctx: &TestHarness) {
    let wf = ClaimWorkflow::new(ctx.db_pool.clone(), CoreConfig::default());
    let ledger = LedgerManager::new(ctx.db_pool.clone());

    let err = wf
        .handle_pr_merged(&ledger, "https://github.com/example/repo/pull/404")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn merging_twice_settles_only_once(ctx: &TestHarness) {
    let user = create_user(Permission::Reviewer, &ctx.db_pool).await;
    let transcript = create_queued_transcript("merge-twice", "a b c", &ctx.db_pool).await;

    let wf = ClaimWorkflow::new(ctx.db_pool.clone(), CoreConfig::default());
    let ledger = LedgerManager::new(ctx.db_pool.clone());

    let (_, review) = wf.claim(transcript.id, user.id).await.expect("claim");
    wf.submit(review.id, "https://github.com/example/repo/pull/43")
        .await
        .expect("submit");

    wf.handle_pr_merged(&ledger, "https://github.com/example/repo/pull/43")
        .await
        .expect("first merge");

    // A redelivered webhook must not double-credit
    let err = wf
        .handle_pr_merged(&ledger, "https://github.com/example/repo/pull/43")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)), "got {err:?}");

    let wallet = Wallet::find_by_user(user.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    // total_words=3, diff=0 → round(1.5) = 2, credited exactly once
    assert_eq!(wallet.balance, 2);
}
