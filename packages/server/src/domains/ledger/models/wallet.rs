use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{UserId, WalletId};

/// Wallet - one per user, balance in sats.
///
/// The balance changes only through a paired transaction row; nothing
/// mutates it independently.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    pub balance: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Wallet {
    /// Find a user's wallet
    pub async fn find_by_user(user_id: UserId, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Load a user's wallet under a row lock.
    ///
    /// Every balance read-modify-write goes through this so concurrent
    /// ledger operations on one wallet serialize on the row. NO KEY UPDATE
    /// rather than FOR UPDATE: ledger rows referencing the wallet must be
    /// insertable from other connections while the balance lock is held
    /// (the FK check takes KEY SHARE, which FOR UPDATE would block).
    pub async fn lock_by_user(
        user_id: UserId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1 FOR NO KEY UPDATE")
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }

    /// Write the new balance inside the transaction that holds the lock
    pub async fn set_balance(
        id: WalletId,
        balance: i64,
        conn: &mut PgConnection,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE wallets SET balance = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(balance)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Create an empty wallet for a user
    pub async fn create(user_id: UserId, pool: &PgPool) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Wallet>(
            "INSERT INTO wallets (id, user_id, balance) VALUES ($1, $2, 0) RETURNING *",
        )
        .bind(WalletId::new())
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
