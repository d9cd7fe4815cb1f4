//! Wallet balance, transaction history, and Lightning withdrawals.

use axum::extract::{Extension, Query};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::CoreError;
use crate::domains::ledger::models::transaction::Transaction;
use crate::domains::ledger::models::wallet::Wallet;
use crate::server::app::AppState;
use crate::server::auth::AuthedUser;
use crate::server::error::ApiError;

#[derive(Serialize)]
pub struct WalletResponse {
    pub id: crate::common::WalletId,
    pub balance: i64,
}

/// Balance lookup for the calling user
pub async fn wallet_handler(
    Extension(state): Extension<AppState>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<WalletResponse>, ApiError> {
    let wallet = Wallet::find_by_user(user_id, &state.db_pool)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("wallet for user {user_id}")))?;
    Ok(Json(WalletResponse {
        id: wallet.id,
        balance: wallet.balance,
    }))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Transaction history for the calling user, newest first
pub async fn transactions_handler(
    Extension(state): Extension<AppState>,
    AuthedUser(user_id): AuthedUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let wallet = Wallet::find_by_user(user_id, &state.db_pool)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("wallet for user {user_id}")))?;
    let transactions = Transaction::list_for_wallet(
        wallet.id,
        query.limit.clamp(1, 200),
        query.offset.max(0),
        &state.db_pool,
    )
    .await?;
    Ok(Json(transactions))
}

#[derive(Deserialize)]
pub struct WithdrawRequest {
    pub invoice: String,
    pub amount_sats: i64,
}

/// Pay out part of the balance to a Lightning invoice
pub async fn withdraw_handler(
    Extension(state): Extension<AppState>,
    AuthedUser(user_id): AuthedUser,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .ledger
        .create_debit(
            user_id,
            request.amount_sats,
            &request.invoice,
            state.lightning.as_ref(),
        )
        .await?;
    Ok(Json(transaction))
}
