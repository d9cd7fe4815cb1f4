// Business domains
pub mod ledger;
pub mod reviews;
pub mod transcripts;
pub mod users;
