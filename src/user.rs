//! Users are owned by the account service; devhub only reads and deletes
//! them.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const MAX_ID_LENGTH: usize = 64;

/// Value object of a valid user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier is empty, too long or contains forbidden characters.
#[derive(Debug, thiserror::Error)]
#[error("user id must be 1 to 64 characters of [A-Za-z0-9_-]")]
pub struct InvalidUserId;

impl UserId {
    /// Converts a [`String`] into a valid [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string is empty, longer than 64 characters or
    /// contains anything other than ASCII alphanumerics, `_` and `-`.
    pub fn parse(id: impl Into<String>) -> std::result::Result<Self, InvalidUserId> {
        let id = id.into();
        let valid = (1..=MAX_ID_LENGTH).contains(&id.len())
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if valid { Ok(Self(id)) } else { Err(InvalidUserId) }
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Database user representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new [`User`], as the account service would.
    pub fn new(id: UserId, name: impl Into<String>, avatar: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar,
            created_at: Utc::now(),
        }
    }
}

/// Public projection of a [`User`] joined into other aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
}

impl UserSummary {
    /// Summary for an owner whose user record could not be read.
    pub fn detached(id: UserId) -> Self {
        Self {
            id,
            name: String::default(),
            avatar: None,
        }
    }
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar: user.avatar,
        }
    }
}

/// Port for user lookups.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>>;

    /// Find every user whose ID is in `ids`. Unknown IDs are skipped.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>>;
}
