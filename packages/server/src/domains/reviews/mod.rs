pub mod expiry;
pub mod models;
pub mod state;

pub use models::Review;
pub use state::{classify, expiry_cutoff, ReviewState};
