use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;

use crate::common::{ReviewId, TransactionId, WalletId};

/// Transaction - one ledger row per balance mutation attempt.
///
/// Credit rows are write-once: a failed credit is recorded as its own row
/// rather than updating an earlier one. Debit rows start `pending` before
/// the provider is called and are upgraded to their terminal status, so an
/// in-flight withdrawal always has a durable audit row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: TransactionId,
    pub wallet_id: WalletId,
    /// Absent for debit withdrawals unrelated to reviews
    pub review_id: Option<ReviewId>,
    /// Always positive; direction comes from transaction_type
    pub amount: i64,
    pub transaction_type: String,   // 'credit', 'debit'
    pub transaction_status: String, // 'success', 'failed', 'pending'

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ledger entry direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Credit => write!(f, "credit"),
            TransactionType::Debit => write!(f, "debit"),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "credit" => Ok(TransactionType::Credit),
            "debit" => Ok(TransactionType::Debit),
            _ => Err(anyhow::anyhow!("Invalid transaction type: {}", s)),
        }
    }
}

/// Ledger entry outcome
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Success,
    Failed,
    Pending,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Failed => write!(f, "failed"),
            TransactionStatus::Pending => write!(f, "pending"),
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "success" => Ok(TransactionStatus::Success),
            "failed" => Ok(TransactionStatus::Failed),
            "pending" => Ok(TransactionStatus::Pending),
            _ => Err(anyhow::anyhow!("Invalid transaction status: {}", s)),
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Transaction {
    /// Insert a ledger row. Takes any executor so it can run inside the
    /// balance transaction or, for compensating rows, directly on the pool.
    pub async fn insert<'e, E: PgExecutor<'e>>(
        wallet_id: WalletId,
        review_id: Option<ReviewId>,
        amount: i64,
        transaction_type: TransactionType,
        transaction_status: TransactionStatus,
        executor: E,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (id, wallet_id, review_id, amount, transaction_type, transaction_status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(TransactionId::new())
        .bind(wallet_id)
        .bind(review_id)
        .bind(amount)
        .bind(transaction_type.to_string())
        .bind(transaction_status.to_string())
        .fetch_one(executor)
        .await
    }

    /// Upgrade a row to its terminal status (pending debit settlement)
    pub async fn set_status<'e, E: PgExecutor<'e>>(
        id: TransactionId,
        transaction_status: TransactionStatus,
        executor: E,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET transaction_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(transaction_status.to_string())
        .fetch_one(executor)
        .await
    }

    /// Transaction history for a wallet, newest first
    pub async fn list_for_wallet(
        wallet_id: WalletId,
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE wallet_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(wallet_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Transactions recorded against a review (audit queries, tests)
    pub async fn list_for_review(
        review_id: ReviewId,
        pool: &PgPool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE review_id = $1 ORDER BY created_at",
        )
        .bind(review_id)
        .fetch_all(pool)
        .await
    }

    /// Recompute a wallet's balance from its terminal ledger rows:
    /// success credits minus success debits. The stored balance must always
    /// equal this sum.
    pub async fn ledger_balance(wallet_id: WalletId, pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN transaction_type = 'credit' THEN amount ELSE -amount END
            ), 0)::BIGINT
            FROM transactions
            WHERE wallet_id = $1 AND transaction_status = 'success'
            "#,
        )
        .bind(wallet_id)
        .fetch_one(pool)
        .await
    }
}
