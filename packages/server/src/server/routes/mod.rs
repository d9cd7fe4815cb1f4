// HTTP routes
pub mod health;
pub mod transcripts;
pub mod wallet;
pub mod webhook;

pub use health::*;
pub use transcripts::*;
pub use wallet::*;
pub use webhook::*;
