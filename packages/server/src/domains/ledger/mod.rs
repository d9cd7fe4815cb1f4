pub mod manager;
pub mod models;

pub use manager::LedgerManager;
pub use models::{Transaction, TransactionStatus, TransactionType, Wallet};
