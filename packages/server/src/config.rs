use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub lightning_api_url: String,
    pub lightning_api_key: Option<String>,
    pub core: CoreConfig,
}

/// Tunables for the review lifecycle and ledger core.
///
/// Injected into each component at construction; there are no ambient
/// globals. Defaults match the production marketplace.
#[derive(Debug, Clone, Copy)]
pub struct CoreConfig {
    /// Hours an unsubmitted claim stays alive before the sweep requeues it.
    pub expiry_hours: i64,
    /// Maximum reviews a user may have sitting in the pending (submitted,
    /// unmerged) state before new claims are refused.
    pub max_pending_reviews: i64,
    /// Sats credited per counted word (applied to both the word count and
    /// the diff-word count).
    pub reward_rate: f64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            expiry_hours: 24,
            max_pending_reviews: 3,
            reward_rate: 0.5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = CoreConfig::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            lightning_api_url: env::var("LIGHTNING_API_URL")
                .unwrap_or_else(|_| "https://api.opennode.com".to_string()),
            lightning_api_key: env::var("LIGHTNING_API_KEY").ok(),
            core: CoreConfig {
                expiry_hours: env::var("REVIEW_EXPIRY_HOURS")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()
                    .context("REVIEW_EXPIRY_HOURS must be a valid number")?
                    .unwrap_or(defaults.expiry_hours),
                max_pending_reviews: env::var("MAX_PENDING_REVIEWS")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()
                    .context("MAX_PENDING_REVIEWS must be a valid number")?
                    .unwrap_or(defaults.max_pending_reviews),
                reward_rate: env::var("REWARD_RATE_SATS_PER_WORD")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()
                    .context("REWARD_RATE_SATS_PER_WORD must be a valid number")?
                    .unwrap_or(defaults.reward_rate),
            },
        })
    }
}
