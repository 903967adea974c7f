//! In-memory store.
//!
//! Every aggregate lives behind a single lock, so an upsert's
//! exists-then-write runs as one critical section.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::post::{Post, PostRepository};
use crate::profile::{Profile, ProfileFields, ProfileRepository};
use crate::user::{User, UserId, UserRepository};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    /// Creation order.
    profiles: Vec<Profile>,
    /// Insertion order.
    posts: Vec<Post>,
}

/// Shared in-memory storage. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Insert or replace a user record.
    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id.clone(), user);
    }

    /// Whether a user record exists.
    pub async fn has_user(&self, id: &UserId) -> bool {
        self.state.read().await.users.contains_key(id)
    }

    /// Number of stored profiles.
    pub async fn profile_count(&self) -> usize {
        self.state.read().await.profiles.len()
    }

    /// Number of stored posts.
    pub async fn post_count(&self) -> usize {
        self.state.read().await.posts.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_by_user(&self, user: &UserId) -> Result<Option<Profile>> {
        Ok(self
            .state
            .read()
            .await
            .profiles
            .iter()
            .find(|profile| &profile.user == user)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Profile>> {
        Ok(self.state.read().await.profiles.clone())
    }

    async fn upsert(&self, user: &UserId, fields: ProfileFields) -> Result<Profile> {
        let mut state = self.state.write().await;
        let profiles = &mut state.profiles;

        if let Some(profile) = profiles.iter_mut().find(|profile| &profile.user == user) {
            profile.merge(fields);
            return Ok(profile.clone());
        }

        let profile = Profile::new(user.clone(), fields);
        profiles.push(profile.clone());
        Ok(profile)
    }

    async fn save(&self, profile: &Profile) -> Result<()> {
        let mut state = self.state.write().await;

        let stored = state
            .profiles
            .iter_mut()
            .find(|stored| stored.user == profile.user)
            .ok_or(ServerError::NotFound("profile"))?;
        *stored = profile.clone();

        Ok(())
    }

    async fn delete_with_owner(&self, user: &UserId) -> Result<()> {
        let mut state = self.state.write().await;
        state.profiles.retain(|profile| &profile.user != user);
        state.users.remove(user);

        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert(&self, post: &Post) -> Result<()> {
        self.state.write().await.posts.push(post.clone());
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        let mut posts = self.state.read().await.posts.clone();
        // Reverse first so equal timestamps stay newest-inserted first.
        posts.reverse();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(posts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self
            .state
            .read()
            .await
            .posts
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }
}
