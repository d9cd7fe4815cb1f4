//! Integration tests for transcript ingestion: marker validation and
//! hash-based duplicate rejection, including the concurrent case.

mod common;

use crate::common::{reviewable_content, TestHarness};
use review_core::common::CoreError;
use review_core::domains::transcripts::ingest::ingest_transcript;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn valid_document_is_queued(ctx: &TestHarness) {
    let content = reviewable_content("ingest-valid", "a b c d");
    let transcript = ingest_transcript(content.clone(), &ctx.db_pool)
        .await
        .expect("ingest");

    assert_eq!(transcript.status, "queued");
    assert!(transcript.is_claimable());
    assert_eq!(transcript.transcript_hash, content.transcript_hash());
    assert_eq!(transcript.content.0, transcript.original_content.0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn document_without_markers_is_rejected(ctx: &TestHarness) {
    let mut content = reviewable_content("ingest-markers", "a b c");
    content.transcript_by = "alice".to_string();

    let err = ingest_transcript(content, &ctx.db_pool).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)), "got {err:?}");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn resubmitting_the_same_document_conflicts(ctx: &TestHarness) {
    let content = reviewable_content("ingest-duplicate", "a b c d e");
    ingest_transcript(content.clone(), &ctx.db_pool)
        .await
        .expect("first ingest");

    let err = ingest_transcript(content, &ctx.db_pool).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)), "got {err:?}");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_duplicate_ingests_queue_exactly_one(ctx: &TestHarness) {
    let content = reviewable_content("ingest-race", "a b c d");

    let mut handles = Vec::new();
    for _ in 0..2 {
        let content = content.clone();
        let pool = ctx.db_pool.clone();
        handles.push(tokio::spawn(
            async move { ingest_transcript(content, &pool).await },
        ));
    }

    let mut queued = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => queued += 1,
            Err(CoreError::Conflict(_)) => rejected += 1,
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }

    // The unique hash index decides the race whichever ingest wins it
    assert_eq!((queued, rejected), (1, 1));

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM transcripts WHERE transcript_hash = $1")
            .bind(content.transcript_hash())
            .fetch_one(&ctx.db_pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}
