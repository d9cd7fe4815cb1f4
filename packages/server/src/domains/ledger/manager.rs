//! Atomic wallet-balance mutations paired with ledger rows.
//!
//! Every balance change happens inside a database transaction holding a row
//! lock on the wallet. When a credit fails after the wallet load, the
//! balance change rolls back and a compensating `failed` transaction row is
//! written directly on the pool, outside the rolled-back transaction, so the
//! audit trail survives. Debits write a `pending` row before the provider
//! is called and upgrade it to the terminal status afterwards.

use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::common::{CoreError, CoreResult, UserId};
use crate::domains::reviews::models::review::Review;
use crate::domains::users::models::user::User;
use crate::kernel::lightning::LightningClient;

use super::models::transaction::{Transaction, TransactionStatus, TransactionType};
use super::models::wallet::Wallet;

#[derive(Clone)]
pub struct LedgerManager {
    pool: PgPool,
}

impl LedgerManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Credit a merged review's reward into the reviewer's wallet.
    ///
    /// `amount_sats` must already be rounded to integer sats. Missing
    /// user/wallet rejects with `NotFound` before any row is written.
    pub async fn create_credit(
        &self,
        review: &Review,
        amount_sats: i64,
    ) -> CoreResult<Transaction> {
        if amount_sats < 0 {
            return Err(CoreError::validation("credit amount must be non-negative"));
        }

        let user = User::find_by_id(review.user_id, &self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("user {}", review.user_id)))?;

        let mut tx = self.pool.begin().await?;

        let wallet = Wallet::lock_by_user(user.id, &mut tx)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("wallet for user {}", user.id)))?;

        let credit = async {
            let row = Transaction::insert(
                wallet.id,
                Some(review.id),
                amount_sats,
                TransactionType::Credit,
                TransactionStatus::Success,
                &mut *tx,
            )
            .await?;
            Wallet::set_balance(wallet.id, wallet.balance + amount_sats, &mut tx).await?;
            Ok::<_, sqlx::Error>(row)
        }
        .await;

        match credit {
            Ok(row) => {
                tx.commit().await?;
                info!(
                    review_id = %review.id,
                    wallet_id = %wallet.id,
                    amount_sats,
                    "review reward credited"
                );
                Ok(row)
            }
            Err(e) => {
                // Roll back the balance mutation, keep the audit record.
                drop(tx);
                self.record_failed(wallet.id, Some(review.id), amount_sats, TransactionType::Credit)
                    .await;
                Err(CoreError::Ledger(format!("credit failed: {e}")))
            }
        }
    }

    /// Debit a withdrawal from a user's wallet by paying a Lightning invoice.
    ///
    /// Balance sufficiency is verified under the wallet row lock before the
    /// provider is called; the provider call is at-most-once and cannot be
    /// rolled back, so the lock is held until the outcome is recorded. A
    /// `pending` row is committed before the provider call and upgraded
    /// afterwards, so the attempt has durable ledger evidence even if the
    /// process dies mid-withdrawal.
    pub async fn create_debit(
        &self,
        user_id: UserId,
        amount_sats: i64,
        invoice: &str,
        lightning: &dyn LightningClient,
    ) -> CoreResult<Transaction> {
        if amount_sats <= 0 {
            return Err(CoreError::validation("withdrawal amount must be positive"));
        }
        if invoice.trim().is_empty() {
            return Err(CoreError::validation("invoice is required"));
        }

        let mut tx = self.pool.begin().await?;

        let wallet = Wallet::lock_by_user(user_id, &mut tx)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("wallet for user {user_id}")))?;

        if wallet.balance < amount_sats {
            return Err(CoreError::conflict(format!(
                "insufficient balance: {} sats available, {} requested",
                wallet.balance, amount_sats
            )));
        }

        // Written on the pool so it is committed before the irreversible
        // provider call; the balance transaction keeps the wallet lock, so
        // no second debit can pass the sufficiency check in the meantime.
        let pending = Transaction::insert(
            wallet.id,
            None,
            amount_sats,
            TransactionType::Debit,
            TransactionStatus::Pending,
            &self.pool,
        )
        .await?;

        let receipt = match lightning.pay_invoice(invoice, amount_sats).await {
            Ok(receipt) => receipt,
            Err(e) => {
                drop(tx);
                self.finish_pending(pending.id, TransactionStatus::Failed).await;
                return Err(CoreError::ExternalProvider(e.to_string()));
            }
        };

        let debit = async {
            let row =
                Transaction::set_status(pending.id, TransactionStatus::Success, &mut *tx).await?;
            Wallet::set_balance(wallet.id, wallet.balance - amount_sats, &mut tx).await?;
            Ok::<_, sqlx::Error>(row)
        }
        .await;

        match debit {
            Ok(row) => {
                tx.commit().await?;
                info!(
                    wallet_id = %wallet.id,
                    amount_sats,
                    provider_id = %receipt.provider_id,
                    "withdrawal settled"
                );
                Ok(row)
            }
            Err(e) => {
                // The provider already paid; the row stays pending so
                // reconciliation can find the attempt.
                drop(tx);
                error!(
                    wallet_id = %wallet.id,
                    amount_sats,
                    provider_id = %receipt.provider_id,
                    "payment settled but ledger write failed; manual reconciliation required"
                );
                Err(CoreError::Ledger(format!("debit failed: {e}")))
            }
        }
    }

    /// Upgrade a pending debit row to its terminal status, outside the
    /// rolled-back balance transaction. Its own failure is only logged
    /// since there is no further fallback.
    async fn finish_pending(
        &self,
        transaction_id: crate::common::TransactionId,
        status: TransactionStatus,
    ) {
        if let Err(e) = Transaction::set_status(transaction_id, status, &self.pool).await {
            warn!(%transaction_id, "failed to settle pending ledger row: {e}");
        }
    }

    /// Compensating audit row for a failed credit attempt. Written on the
    /// pool so it survives the rolled-back transaction; its own failure is
    /// only logged since there is no further fallback.
    async fn record_failed(
        &self,
        wallet_id: crate::common::WalletId,
        review_id: Option<crate::common::ReviewId>,
        amount_sats: i64,
        transaction_type: TransactionType,
    ) {
        if let Err(e) = Transaction::insert(
            wallet_id,
            review_id,
            amount_sats,
            transaction_type,
            TransactionStatus::Failed,
            &self.pool,
        )
        .await
        {
            warn!(%wallet_id, amount_sats, "failed to record compensating ledger row: {e}");
        }
    }
}
