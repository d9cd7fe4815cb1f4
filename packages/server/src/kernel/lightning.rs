//! Lightning payment adapter.
//!
//! The ledger's debit path treats payment as an at-most-once external effect
//! it cannot roll back, so it checks balance sufficiency before calling
//! here. Implementations only attempt the payment and report the outcome.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider metadata returned for a settled payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Provider-side identifier for the withdrawal
    pub provider_id: String,
    /// Routing fee charged by the provider, in sats
    pub fee_sats: i64,
}

/// Pays a decoded BOLT11 invoice. Object-safe so the ledger can hold a
/// `dyn LightningClient` and tests can substitute a double.
#[async_trait]
pub trait LightningClient: Send + Sync {
    async fn pay_invoice(&self, invoice: &str, amount_sats: i64) -> Result<PaymentReceipt>;
}

/// OpenNode-style withdrawal API client.
pub struct OpenNodeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct WithdrawalRequest<'a> {
    #[serde(rename = "type")]
    withdrawal_type: &'a str,
    address: &'a str,
    amount: i64,
}

#[derive(Deserialize)]
struct WithdrawalResponse {
    data: WithdrawalData,
}

#[derive(Deserialize)]
struct WithdrawalData {
    id: String,
    #[serde(default)]
    fee: i64,
    status: String,
}

impl OpenNodeClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LightningClient for OpenNodeClient {
    async fn pay_invoice(&self, invoice: &str, amount_sats: i64) -> Result<PaymentReceipt> {
        let response = self
            .http
            .post(format!("{}/v2/withdrawals", self.base_url))
            .header("Authorization", &self.api_key)
            .json(&WithdrawalRequest {
                withdrawal_type: "ln",
                address: invoice,
                amount: amount_sats,
            })
            .send()
            .await
            .context("withdrawal request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("provider rejected withdrawal ({status}): {body}");
        }

        let payload: WithdrawalResponse = response
            .json()
            .await
            .context("malformed withdrawal response")?;

        if payload.data.status == "error" || payload.data.status == "failed" {
            anyhow::bail!("provider reported withdrawal failure: {}", payload.data.status);
        }

        Ok(PaymentReceipt {
            provider_id: payload.data.id,
            fee_sats: payload.data.fee,
        })
    }
}
