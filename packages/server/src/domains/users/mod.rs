pub mod models;

pub use models::{Permission, User};
