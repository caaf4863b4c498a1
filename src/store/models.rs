//! Store entity types

use chrono::{DateTime, Utc};

/// Store-assigned account identifier, monotonic from 1
pub type AccountId = i64;

/// Store-assigned post identifier, monotonic from 1
pub type PostId = i64;

/// A registered account
///
/// `username` and `email` are unique across all accounts and immutable
/// after creation. `credential_hash` is opaque and never serialized
/// outward; API responses go through sanitized DTOs instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub credential_hash: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}

/// Input for account creation. The password is already hashed by the
/// time it reaches the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub credential_hash: String,
}

/// Partial profile update.
///
/// Each field is a double `Option`: the outer level distinguishes
/// "omitted, leave untouched" (`None`) from "provided" (`Some`), and the
/// inner level carries an explicit clear (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub full_name: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub profile_picture_url: Option<Option<String>>,
}

impl ProfilePatch {
    /// True when no field was provided at all
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.bio.is_none() && self.profile_picture_url.is_none()
    }
}

/// A post. Immutable once created; at least one of `content` or
/// `media_url` is present, and `media_type` accompanies `media_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub account_id: AccountId,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for post creation
#[derive(Debug, Clone)]
pub struct NewPost {
    pub account_id: AccountId,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
}

/// Outcome of a like operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Added,
    AlreadyLiked,
}

/// Outcome of an unlike operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlikeOutcome {
    Removed,
    NotFound,
}
