//! API layer
//!
//! HTTP handlers for:
//! - Registration and login
//! - User profiles
//! - Posts and likes

mod auth;
mod dto;
mod posts;
mod users;

pub use dto::*;

pub use auth::auth_router;
pub use posts::post_router;
pub use users::user_router;
