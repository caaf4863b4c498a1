//! Registration and login endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use serde_json::json;

use super::dto::{AccountResponse, LoginRequest, RegisterRequest};
use crate::auth::password;
use crate::error::AppError;
use crate::store::NewAccount;
use crate::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Barely more than a presence check: one `@` with something on both
/// sides and a dot in the domain part.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.username.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Username, email, and password are required.".to_string(),
        ));
    }
    if req.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters long.".to_string(),
        ));
    }
    if !is_plausible_email(&req.email) {
        return Err(AppError::Validation("Invalid email format.".to_string()));
    }

    // Fast-path duplicate check before expensive hashing. The store
    // re-checks atomically at insertion, so this is advisory only.
    if state.store.find_by_email(&req.email).is_some() {
        return Err(AppError::Conflict(
            "User with this email already exists.".to_string(),
        ));
    }
    if state.store.find_by_username(&req.username).is_some() {
        return Err(AppError::Conflict("Username already taken.".to_string()));
    }

    // Argon2 is CPU-expensive by design; keep it off the async runtime
    // and outside any store lock.
    let auth_config = state.config.auth.clone();
    let password_to_hash = req.password.clone();
    let credential_hash = tokio::task::spawn_blocking(move || {
        password::hash_password(
            &password_to_hash,
            auth_config.hash_memory_kib,
            auth_config.hash_iterations,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    let account = state.store.create_account(NewAccount {
        username: req.username,
        email: req.email,
        credential_hash,
    })?;

    tracing::info!(account_id = account.id, username = %account.username, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully!",
            "user": AccountResponse::from(account),
        })),
    ))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same 401 so the endpoint
/// cannot be used as an account oracle.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required.".to_string(),
        ));
    }

    let account = state
        .store
        .find_by_email(&req.email)
        .ok_or(AppError::Unauthorized)?;

    let credential_hash = account.credential_hash.clone();
    let password_to_check = req.password.clone();
    let verified = tokio::task::spawn_blocking(move || {
        password::verify_password(&password_to_check, &credential_hash)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    if !verified {
        return Err(AppError::Unauthorized);
    }

    let token = state.tokens.issue(&account)?;

    tracing::info!(account_id = account.id, "Login successful");

    Ok(Json(json!({
        "message": "Login successful!",
        "token": token,
        "user": AccountResponse::from(account),
    })))
}
