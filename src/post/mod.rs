//! Posts and their persistence port.
mod service;

pub use service::PostService;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::user::{User, UserId};

/// Short text post. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Author.
    pub user: UserId,
    pub text: String,
    /// Author name when the post was written.
    pub name: String,
    /// Author avatar when the post was written.
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new [`Post`] stamped with a snapshot of `author`.
    pub fn new(author: &User, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: author.id.clone(),
            text: text.into(),
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Port for post persistence operations.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Store a new post.
    async fn insert(&self, post: &Post) -> Result<()>;

    /// Every post, newest first.
    async fn find_all(&self) -> Result<Vec<Post>>;

    /// Find a post by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>>;
}
