//! Database Models

pub mod blog;
pub mod serde_helpers;
pub mod user;

pub use blog::{Blog, BlogCreate, BlogId, BlogUpdate, Comment};
pub use user::{User, UserId};
