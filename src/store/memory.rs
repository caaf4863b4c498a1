//! In-memory store implementation
//!
//! Volatile, process-lifetime state. All collections live behind a single
//! `RwLock`; each logical operation takes the lock exactly once, so
//! check-then-mutate sequences (uniqueness checks, like toggles) cannot
//! interleave with concurrent writers.

use std::collections::HashSet;
use std::sync::RwLock;

use chrono::Utc;

use super::models::{
    Account, AccountId, LikeOutcome, NewAccount, NewPost, Post, PostId, ProfilePatch,
    UnlikeOutcome,
};
use super::{IdentityStore, StoreError};

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    next_account_id: AccountId,
    posts: Vec<Post>,
    next_post_id: PostId,
    /// Like relation as a set of (account, post) pairs
    likes: HashSet<(AccountId, PostId)>,
}

/// In-memory [`IdentityStore`]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_account_id: 1,
                next_post_id: 1,
                ..Inner::default()
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for MemoryStore {
    fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");

        // Both uniqueness checks and the insertion happen under one
        // write-lock acquisition.
        if inner.accounts.iter().any(|a| a.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        if inner.accounts.iter().any(|a| a.username == new.username) {
            return Err(StoreError::DuplicateUsername);
        }

        let account = Account {
            id: inner.next_account_id,
            username: new.username,
            email: new.email,
            credential_hash: new.credential_hash,
            full_name: None,
            bio: None,
            profile_picture_url: None,
        };
        inner.next_account_id += 1;
        inner.accounts.push(account.clone());
        Ok(account)
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.accounts.iter().find(|a| a.email == email).cloned()
    }

    fn find_by_username(&self, username: &str) -> Option<Account> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned()
    }

    fn find_by_id(&self, id: AccountId) -> Option<Account> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.accounts.iter().find(|a| a.id == id).cloned()
    }

    fn update_profile(&self, id: AccountId, patch: ProfilePatch) -> Result<Account, StoreError> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let account = inner
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(full_name) = patch.full_name {
            account.full_name = full_name;
        }
        if let Some(bio) = patch.bio {
            account.bio = bio;
        }
        if let Some(profile_picture_url) = patch.profile_picture_url {
            account.profile_picture_url = profile_picture_url;
        }

        Ok(account.clone())
    }

    fn create_post(&self, new: NewPost) -> Post {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let now = Utc::now();
        let post = Post {
            id: inner.next_post_id,
            account_id: new.account_id,
            content: new.content,
            media_url: new.media_url,
            media_type: new.media_type,
            created_at: now,
            updated_at: now,
        };
        inner.next_post_id += 1;
        inner.posts.push(post.clone());
        post
    }

    fn list_posts(&self) -> Vec<Post> {
        let inner = self.inner.read().expect("store lock poisoned");
        let mut posts = inner.posts.clone();
        // Stable sort: posts with equal timestamps keep insertion order.
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    fn find_post(&self, id: PostId) -> Option<Post> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.posts.iter().find(|p| p.id == id).cloned()
    }

    fn like(&self, account_id: AccountId, post_id: PostId) -> LikeOutcome {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if inner.likes.insert((account_id, post_id)) {
            LikeOutcome::Added
        } else {
            LikeOutcome::AlreadyLiked
        }
    }

    fn unlike(&self, account_id: AccountId, post_id: PostId) -> UnlikeOutcome {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if inner.likes.remove(&(account_id, post_id)) {
            UnlikeOutcome::Removed
        } else {
            UnlikeOutcome::NotFound
        }
    }

    fn like_count(&self, post_id: PostId) -> usize {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.likes.iter().filter(|(_, p)| *p == post_id).count()
    }

    fn has_liked(&self, account_id: AccountId, post_id: PostId) -> bool {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.likes.contains(&(account_id, post_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_account(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            credential_hash: "hash".to_string(),
        }
    }

    fn text_post(store: &MemoryStore, account_id: AccountId, content: &str) -> Post {
        store.create_post(NewPost {
            account_id,
            content: Some(content.to_string()),
            media_url: None,
            media_type: None,
        })
    }

    #[test]
    fn create_account_assigns_monotonic_ids() {
        let store = MemoryStore::new();
        let a = store.create_account(new_account("a", "a@x.com")).unwrap();
        let b = store.create_account(new_account("b", "b@x.com")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn create_account_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.create_account(new_account("a", "a@x.com")).unwrap();
        let err = store
            .create_account(new_account("b", "a@x.com"))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail);
    }

    #[test]
    fn create_account_rejects_duplicate_username() {
        let store = MemoryStore::new();
        store.create_account(new_account("a", "a@x.com")).unwrap();
        let err = store
            .create_account(new_account("a", "b@x.com"))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateUsername);
    }

    #[test]
    fn concurrent_registration_admits_one_winner_per_email() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();

        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.create_account(NewAccount {
                    username: format!("user{}", i),
                    email: "contested@x.com".to_string(),
                    credential_hash: "hash".to_string(),
                })
            }));
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn concurrent_registration_admits_one_winner_per_username() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();

        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.create_account(NewAccount {
                    username: "contested".to_string(),
                    email: format!("user{}@x.com", i),
                    credential_hash: "hash".to_string(),
                })
            }));
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn update_profile_distinguishes_omitted_from_cleared() {
        let store = MemoryStore::new();
        let account = store.create_account(new_account("a", "a@x.com")).unwrap();

        let updated = store
            .update_profile(
                account.id,
                ProfilePatch {
                    full_name: Some(Some("Ada".to_string())),
                    bio: Some(Some("hello".to_string())),
                    profile_picture_url: None,
                },
            )
            .unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Ada"));
        assert_eq!(updated.bio.as_deref(), Some("hello"));

        // Omitting full_name leaves it untouched; clearing bio removes it.
        let updated = store
            .update_profile(
                account.id,
                ProfilePatch {
                    full_name: None,
                    bio: Some(None),
                    profile_picture_url: None,
                },
            )
            .unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Ada"));
        assert_eq!(updated.bio, None);
    }

    #[test]
    fn update_profile_unknown_account_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_profile(99, ProfilePatch::default())
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }

    #[test]
    fn list_posts_is_newest_first() {
        let store = MemoryStore::new();
        let first = text_post(&store, 1, "first");
        let second = text_post(&store, 1, "second");

        let posts = store.list_posts();
        assert_eq!(posts.len(), 2);
        // Equal timestamps fall back to insertion order, so "first" is
        // never sorted ahead of "second" incorrectly.
        if posts[0].created_at == posts[1].created_at {
            assert_eq!(posts[0].id, first.id);
            assert_eq!(posts[1].id, second.id);
        } else {
            assert_eq!(posts[0].id, second.id);
            assert_eq!(posts[1].id, first.id);
        }
    }

    #[test]
    fn like_toggle_is_idempotent() {
        let store = MemoryStore::new();
        let post = text_post(&store, 1, "hi");

        assert_eq!(store.like_count(post.id), 0);
        assert_eq!(store.like(2, post.id), LikeOutcome::Added);
        assert_eq!(store.like(2, post.id), LikeOutcome::AlreadyLiked);
        assert_eq!(store.like_count(post.id), 1);
        assert!(store.has_liked(2, post.id));

        assert_eq!(store.unlike(2, post.id), UnlikeOutcome::Removed);
        assert_eq!(store.unlike(2, post.id), UnlikeOutcome::NotFound);
        assert_eq!(store.like_count(post.id), 0);
        assert!(!store.has_liked(2, post.id));
    }

    #[test]
    fn concurrent_likes_count_once() {
        let store = Arc::new(MemoryStore::new());
        let post = text_post(&store, 1, "hi");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            let post_id = post.id;
            handles.push(std::thread::spawn(move || store.like(2, post_id)));
        }

        let added = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| *o == LikeOutcome::Added)
            .count();
        assert_eq!(added, 1);
        assert_eq!(store.like_count(post.id), 1);
    }

    #[test]
    fn reads_return_independent_snapshots() {
        let store = MemoryStore::new();
        let account = store.create_account(new_account("a", "a@x.com")).unwrap();

        let snapshot = store.find_by_id(account.id).unwrap();
        store
            .update_profile(
                account.id,
                ProfilePatch {
                    bio: Some(Some("changed".to_string())),
                    ..ProfilePatch::default()
                },
            )
            .unwrap();

        // The earlier snapshot is unaffected by the later mutation.
        assert_eq!(snapshot.bio, None);
    }
}
