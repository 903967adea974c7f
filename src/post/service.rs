use std::sync::Arc;

use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::error::{Result, ServerError};
use crate::post::{Post, PostRepository};
use crate::user::{UserId, UserRepository};

/// Post manager.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    /// Create a new [`PostService`].
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Publish `text` on behalf of `author`.
    ///
    /// Blank `text` is a validation error on the `text` field.
    pub async fn create(&self, author: &UserId, text: String) -> Result<Post> {
        if text.trim().is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add(
                "text",
                ValidationError::new("blank").with_message("Text is required.".into()),
            );
            return Err(ServerError::Validation(errors));
        }

        let user = self
            .users
            .find_by_id(author)
            .await?
            .ok_or(ServerError::NotFound("user"))?;

        let post = Post::new(&user, text);
        self.posts.insert(&post).await?;

        metrics::counter!("posts_created_total").increment(1);
        tracing::debug!(user_id = %author, post_id = %post.id, "post created");

        Ok(post)
    }

    /// Every post, newest first.
    pub async fn list(&self) -> Result<Vec<Post>> {
        self.posts.find_all().await
    }

    /// Find a post from an unchecked identifier.
    pub async fn get(&self, post_id: &str) -> Result<Post> {
        let id = Uuid::parse_str(post_id).map_err(|_| ServerError::NotFound("post"))?;

        self.posts
            .find_by_id(id)
            .await?
            .ok_or(ServerError::NotFound("post"))
    }
}
