//! Trandaiz - a small social-networking backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Registration / login                                     │
//! │  - Profiles, posts, likes                                   │
//! │  - WebSocket upgrade for direct messaging                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Real-time Layer                          │
//! │  - Actor per connection                                     │
//! │  - Identity → connection registry                           │
//! │  - Frame router (AUTH handshake, directed SEND)             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - In-memory identity store (volatile, process-lifetime)    │
//! │  - Argon2 credentials + HS256 identity tokens               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers for auth, profiles, and posts
//! - `ws`: real-time channel (registry, protocol, per-connection actor)
//! - `store`: in-memory identity store
//! - `auth`: password hashing, identity tokens, bearer extractors
//! - `config`: configuration management
//! - `error`: error types

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod store;
pub mod ws;

use std::sync::Arc;

/// Application state shared across all handlers and connection actors
///
/// Cloned per request; every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Identity store (accounts, posts, likes)
    pub store: Arc<dyn store::IdentityStore>,

    /// Identity token issuing/validation
    pub tokens: Arc<auth::TokenService>,

    /// Identity → live connection bindings
    pub registry: Arc<ws::ConnectionRegistry>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Errors
    /// Returns error if the configuration is invalid.
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        config.validate()?;

        let tokens = auth::TokenService::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.token_ttl_seconds,
        );

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store::MemoryStore::new()),
            tokens: Arc::new(tokens),
            registry: Arc::new(ws::ConnectionRegistry::new()),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{routing::get, Router};
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(ws::ws_upgrade))
        .nest("/api/auth", api::auth_router())
        .nest("/api/users", api::user_router())
        .nest("/api/posts", api::post_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
