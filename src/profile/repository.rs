//! Profile persistence port.

use async_trait::async_trait;

use crate::error::Result;
use crate::profile::{Profile, ProfileFields};
use crate::user::UserId;

/// Port for profile persistence operations.
///
/// Implementations must treat the owning user as a unique key.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find the profile owned by `user`.
    async fn find_by_user(&self, user: &UserId) -> Result<Option<Profile>>;

    /// Every profile, oldest first.
    async fn find_all(&self) -> Result<Vec<Profile>>;

    /// Create the profile of `user`, or merge `fields` into it if it already
    /// exists. The decision is atomic: two concurrent calls for the same
    /// user never both create.
    async fn upsert(&self, user: &UserId, fields: ProfileFields) -> Result<Profile>;

    /// Replace a stored profile with `profile`, sub-collections included.
    async fn save(&self, profile: &Profile) -> Result<()>;

    /// Delete the profile of `user` and the user record itself, in one unit.
    /// Missing records are not an error.
    async fn delete_with_owner(&self, user: &UserId) -> Result<()>;
}
