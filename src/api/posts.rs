//! Post and like endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::json;

use super::dto::{AuthorSummary, CreatePostRequest, PostResponse};
use crate::auth::{CurrentUser, MaybeUser};
use crate::error::AppError;
use crate::store::{AccountId, LikeOutcome, NewPost, Post, PostId, UnlikeOutcome};
use crate::AppState;

pub fn post_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_post).get(list_posts))
        .route("/:post_id", get(get_post))
        .route("/:post_id/like", post(like_post))
        .route("/:post_id/like", delete(unlike_post))
}

/// Attach author and like details for the (optionally) authenticated viewer.
fn enrich(state: &AppState, post: Post, viewer: Option<AccountId>) -> PostResponse {
    let author = state
        .store
        .find_by_id(post.account_id)
        .map(AuthorSummary::from);
    let likes_count = state.store.like_count(post.id);
    let user_has_liked = viewer
        .map(|viewer| state.store.has_liked(viewer, post.id))
        .unwrap_or(false);
    PostResponse::new(post, author, likes_count, user_has_liked)
}

/// POST /api/posts
async fn create_post(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let has_content = req.content.as_deref().is_some_and(|c| !c.is_empty());
    if !has_content && req.media_url.is_none() {
        return Err(AppError::Validation(
            "Post content or mediaUrl is required.".to_string(),
        ));
    }
    if req.media_url.is_some() && req.media_type.is_none() {
        return Err(AppError::Validation(
            "mediaType is required if mediaUrl is provided.".to_string(),
        ));
    }

    let post = state.store.create_post(NewPost {
        account_id: claims.sub,
        content: req.content,
        media_url: req.media_url,
        media_type: req.media_type,
    });

    tracing::info!(post_id = post.id, account_id = claims.sub, "Post created");

    let response = enrich(&state, post, Some(claims.sub));
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/posts
///
/// Public; a bearer token only affects the `userHasLiked` flags.
async fn list_posts(
    State(state): State<AppState>,
    MaybeUser(claims): MaybeUser,
) -> Result<impl IntoResponse, AppError> {
    let viewer = claims.map(|c| c.sub);
    let posts: Vec<PostResponse> = state
        .store
        .list_posts()
        .into_iter()
        .map(|post| enrich(&state, post, viewer))
        .collect();
    Ok(Json(posts))
}

/// GET /api/posts/:post_id
async fn get_post(
    State(state): State<AppState>,
    MaybeUser(claims): MaybeUser,
    Path(post_id): Path<PostId>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.store.find_post(post_id).ok_or(AppError::NotFound)?;
    let viewer = claims.map(|c| c.sub);
    Ok(Json(enrich(&state, post, viewer)))
}

/// POST /api/posts/:post_id/like
async fn like_post(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(post_id): Path<PostId>,
) -> Result<impl IntoResponse, AppError> {
    // Likes must reference an existing post
    state.store.find_post(post_id).ok_or(AppError::NotFound)?;

    match state.store.like(claims.sub, post_id) {
        LikeOutcome::Added => Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Post liked successfully." })),
        )),
        LikeOutcome::AlreadyLiked => Err(AppError::Conflict(
            "Post already liked by this user.".to_string(),
        )),
    }
}

/// DELETE /api/posts/:post_id/like
async fn unlike_post(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(post_id): Path<PostId>,
) -> Result<impl IntoResponse, AppError> {
    state.store.find_post(post_id).ok_or(AppError::NotFound)?;

    match state.store.unlike(claims.sub, post_id) {
        UnlikeOutcome::Removed => Ok(Json(json!({ "message": "Post unliked successfully." }))),
        UnlikeOutcome::NotFound => Err(AppError::NotFound),
    }
}
