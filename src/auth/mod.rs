//! Credential service
//!
//! Password hashing (Argon2id), signed identity tokens (HS256 JWT), and
//! the axum extractors that enforce bearer auth on protected routes.

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::{CurrentUser, MaybeUser};
pub use token::{Claims, TokenError, TokenService};
