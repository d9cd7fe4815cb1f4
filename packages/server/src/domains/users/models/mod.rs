pub mod user;

pub use user::{Permission, User};
