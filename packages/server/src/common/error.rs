use thiserror::Error;

/// Error taxonomy for all core review/ledger operations.
///
/// Every operation rejects before mutating state except `Ledger`, which is
/// raised after a compensating failed-transaction row has been written, and
/// `ExternalProvider`, which is raised after the failed debit attempt has
/// been recorded. The HTTP layer maps these to response codes; the core
/// contract is defined purely in terms of these kinds.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Ledger operation failed: {0}")]
    Ledger(String),

    #[error("Payment provider error: {0}")]
    ExternalProvider(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
