use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{UserId, WalletId};

/// User - a contributor, admin, or evaluator in the marketplace
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub github_username: String,
    pub email: Option<String>,
    pub permissions: String, // 'reviewer', 'admin', 'evaluator'

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Permission level enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Reviewer,
    Admin,
    Evaluator,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Reviewer => write!(f, "reviewer"),
            Permission::Admin => write!(f, "admin"),
            Permission::Evaluator => write!(f, "evaluator"),
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reviewer" => Ok(Permission::Reviewer),
            "admin" => Ok(Permission::Admin),
            "evaluator" => Ok(Permission::Evaluator),
            _ => Err(anyhow::anyhow!("Invalid permission: {}", s)),
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl User {
    /// Find user by ID
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find user by GitHub username
    pub async fn find_by_github_username(
        username: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE github_username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Create a user together with their wallet (1:1) in one transaction
    pub async fn create(
        github_username: &str,
        email: Option<&str>,
        permissions: Permission,
        pool: &PgPool,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, github_username, email, permissions)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(UserId::new())
        .bind(github_username)
        .bind(email)
        .bind(permissions.to_string())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO wallets (id, user_id, balance) VALUES ($1, $2, 0)")
            .bind(WalletId::new())
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Returns true if this user carries admin permissions
    pub fn is_admin(&self) -> bool {
        self.permissions == Permission::Admin.to_string()
    }
}
