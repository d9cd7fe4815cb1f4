// Transcript Review Marketplace - API Core
//
// Contributors claim transcripts for editing, submit pull requests, and earn
// sats over Lightning for merged contributions. This crate holds the review
// lifecycle and ledger core plus the thin HTTP shell around it.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
