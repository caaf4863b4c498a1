//! Authentication extractors
//!
//! Protects routes that require a bearer identity token.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use super::token::Claims;
use crate::error::AppError;
use crate::AppState;

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Extractor for the current authenticated user
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(claims): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", claims.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = extract_bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = state.tokens.validate(token)?;
        Ok(CurrentUser(claims))
    }
}

/// Optional current user extractor
///
/// Returns `None` if the request carries no usable bearer token, instead
/// of rejecting. Used by public routes that enrich their response for
/// authenticated viewers.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Claims>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let claims = extract_bearer_token(&parts.headers)
            .and_then(|token| state.tokens.validate(token).ok());
        Ok(MaybeUser(claims))
    }
}
