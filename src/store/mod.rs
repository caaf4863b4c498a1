//! Identity store
//!
//! Authoritative in-memory state for accounts, posts, and likes.
//! Handlers talk to the [`IdentityStore`] trait so a persistent backend
//! can be substituted later without touching callers.

mod memory;
mod models;

pub use memory::MemoryStore;
pub use models::{
    Account, AccountId, LikeOutcome, NewAccount, NewPost, Post, PostId, ProfilePatch,
    UnlikeOutcome,
};

use thiserror::Error;

/// Typed failures for store operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Another account already owns this email
    #[error("email already registered")]
    DuplicateEmail,

    /// Another account already owns this username
    #[error("username already registered")]
    DuplicateUsername,

    /// Referenced entity does not exist
    #[error("entity not found")]
    NotFound,
}

/// Atomic operations over the shared account/post/like collections.
///
/// Every check-then-mutate operation is linearizable: two concurrent
/// `create_account` calls with the same email cannot both succeed, and
/// `like` is an atomic check-and-set. Reads hand out owned snapshots,
/// never references into shared state.
pub trait IdentityStore: Send + Sync {
    /// Create an account, enforcing email and username uniqueness
    /// atomically with the insertion.
    fn create_account(&self, new: NewAccount) -> Result<Account, StoreError>;

    fn find_by_email(&self, email: &str) -> Option<Account>;

    fn find_by_username(&self, username: &str) -> Option<Account>;

    fn find_by_id(&self, id: AccountId) -> Option<Account>;

    /// Apply a partial profile update. Omitted fields are left untouched;
    /// explicitly cleared fields are set to `None`.
    fn update_profile(&self, id: AccountId, patch: ProfilePatch) -> Result<Account, StoreError>;

    fn create_post(&self, new: NewPost) -> Post;

    /// All posts, newest first. Posts sharing a timestamp keep their
    /// insertion order.
    fn list_posts(&self) -> Vec<Post>;

    fn find_post(&self, id: PostId) -> Option<Post>;

    /// Idempotent like: adding an existing (account, post) pair is a
    /// distinct no-op, not an error.
    fn like(&self, account_id: AccountId, post_id: PostId) -> LikeOutcome;

    fn unlike(&self, account_id: AccountId, post_id: PostId) -> UnlikeOutcome;

    fn like_count(&self, post_id: PostId) -> usize;

    fn has_liked(&self, account_id: AccountId, post_id: PostId) -> bool;
}
