//! Request and response bodies for the HTTP API
//!
//! Account-bearing responses go through sanitized DTOs; the credential
//! hash never leaves the store layer.

use serde::{Deserialize, Deserializer, Serialize};

use crate::store::{Account, AccountId, Post, PostId, ProfilePatch};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Sanitized account as returned from registration and login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            full_name: account.full_name,
            bio: account.bio,
            profile_picture_url: account.profile_picture_url,
        }
    }
}

/// Public profile: what any caller may see about an account (no email)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: AccountId,
    pub username: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}

impl From<Account> for PublicProfile {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            full_name: account.full_name,
            bio: account.bio,
            profile_picture_url: account.profile_picture_url,
        }
    }
}

/// Deserialize a field that distinguishes "omitted" from "explicitly
/// null": the outer Option is filled in by `#[serde(default)]` when the
/// key is absent, the inner one by the JSON value.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial profile update request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub profile_picture_url: Option<Option<String>>,
}

impl From<ProfileUpdateRequest> for ProfilePatch {
    fn from(req: ProfileUpdateRequest) -> Self {
        Self {
            full_name: req.full_name,
            bio: req.bio,
            profile_picture_url: req.profile_picture_url,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
}

/// Summary of a post's author, embedded in enriched post responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: AccountId,
    pub username: String,
    pub full_name: Option<String>,
    pub profile_picture_url: Option<String>,
}

impl From<Account> for AuthorSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            full_name: account.full_name,
            profile_picture_url: account.profile_picture_url,
        }
    }
}

/// Post enriched with author and like details for the current viewer
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: PostId,
    pub account_id: AccountId,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub author: Option<AuthorSummary>,
    pub likes_count: usize,
    pub user_has_liked: bool,
}

impl PostResponse {
    pub fn new(
        post: Post,
        author: Option<AuthorSummary>,
        likes_count: usize,
        user_has_liked: bool,
    ) -> Self {
        Self {
            id: post.id,
            account_id: post.account_id,
            content: post.content,
            media_url: post.media_url,
            media_type: post.media_type,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author,
            likes_count,
            user_has_liked,
        }
    }
}
