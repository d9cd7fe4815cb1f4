// Cross-domain services

pub mod lightning;
pub mod scheduled_tasks;

pub use lightning::{LightningClient, OpenNodeClient, PaymentReceipt};
