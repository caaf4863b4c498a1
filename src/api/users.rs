//! User profile endpoints

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use serde_json::json;

use super::dto::{ProfileUpdateRequest, PublicProfile};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::store::{AccountId, ProfilePatch};
use crate::AppState;

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/:user_id/profile", get(get_profile))
        .route("/profile", put(update_profile))
}

/// GET /api/users/:user_id/profile
async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<AccountId>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.store.find_by_id(user_id).ok_or(AppError::NotFound)?;
    Ok(Json(PublicProfile::from(account)))
}

/// PUT /api/users/profile
///
/// The target account comes from the bearer token, not the path.
async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let patch = ProfilePatch::from(req);
    if patch.is_empty() {
        return Err(AppError::Validation("No update data provided.".to_string()));
    }

    let account = state.store.update_profile(claims.sub, patch)?;

    Ok(Json(json!({
        "message": "Profile updated successfully!",
        "user": PublicProfile::from(account),
    })))
}
