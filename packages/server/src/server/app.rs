//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::CoreConfig;
use crate::domains::ledger::manager::LedgerManager;
use crate::domains::transcripts::workflow::ClaimWorkflow;
use crate::kernel::lightning::LightningClient;
use crate::server::routes::{
    archive_handler, claim_handler, health_handler, ingest_handler, list_queued_handler,
    pull_request_handler, submit_handler, transactions_handler, wallet_handler, withdraw_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub workflow: ClaimWorkflow,
    pub ledger: LedgerManager,
    pub lightning: Arc<dyn LightningClient>,
    pub config: CoreConfig,
}

/// Build the Axum application router
pub fn build_app(
    pool: PgPool,
    config: CoreConfig,
    lightning: Arc<dyn LightningClient>,
) -> Router {
    let state = AppState {
        workflow: ClaimWorkflow::new(pool.clone(), config),
        ledger: LedgerManager::new(pool.clone()),
        db_pool: pool,
        lightning,
        config,
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/webhooks/github", post(pull_request_handler))
        .route("/transcripts", get(list_queued_handler).post(ingest_handler))
        .route("/transcripts/:id/claim", post(claim_handler))
        .route("/transcripts/:id/archive", post(archive_handler))
        .route("/reviews/:id/submit", post(submit_handler))
        .route("/wallet", get(wallet_handler))
        .route("/wallet/transactions", get(transactions_handler))
        .route("/wallet/withdraw", post(withdraw_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
