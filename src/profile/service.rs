use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::profile::{
    NewEducation, NewExperience, Profile, ProfileFields, ProfileRepository, ProfileView,
};
use crate::user::{UserId, UserRepository, UserSummary};

/// Profile manager.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    /// Create a new [`ProfileService`].
    pub fn new(profiles: Arc<dyn ProfileRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { profiles, users }
    }

    /// Get the profile owned by `user`.
    pub async fn get(&self, user: &UserId) -> Result<ProfileView> {
        let profile = self.require(user).await?;
        self.join(profile).await
    }

    /// Get a profile from an unchecked owner identifier.
    ///
    /// Malformed identifiers cannot own a profile and are reported as not
    /// found.
    pub async fn get_by_raw_id(&self, user_id: &str) -> Result<ProfileView> {
        let user = UserId::parse(user_id).map_err(|_| ServerError::NotFound("profile"))?;
        self.get(&user).await
    }

    /// List every profile with its owner.
    pub async fn list(&self) -> Result<Vec<ProfileView>> {
        let profiles = self.profiles.find_all().await?;
        let ids = profiles.iter().map(|p| p.user.clone()).collect::<Vec<_>>();

        let mut owners = self
            .users
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|user| (user.id.clone(), UserSummary::from(user)))
            .collect::<HashMap<_, _>>();

        Ok(profiles
            .into_iter()
            .map(|profile| ProfileView {
                user: owners
                    .remove(&profile.user)
                    .unwrap_or_else(|| UserSummary::detached(profile.user.clone())),
                profile,
            })
            .collect())
    }

    /// Create or update the profile of `user`.
    pub async fn upsert(&self, user: &UserId, fields: ProfileFields) -> Result<ProfileView> {
        let profile = self.profiles.upsert(user, fields).await?;
        metrics::counter!("profiles_upserted_total").increment(1);
        tracing::debug!(user_id = %user, profile_id = %profile.id, "profile upserted");

        self.join(profile).await
    }

    /// Delete the profile of `user` and the user account.
    pub async fn delete_with_account(&self, user: &UserId) -> Result<()> {
        self.profiles.delete_with_owner(user).await?;
        tracing::info!(user_id = %user, "profile and account deleted");
        Ok(())
    }

    /// Add an experience entry on top of the list.
    pub async fn add_experience(&self, user: &UserId, entry: NewExperience) -> Result<ProfileView> {
        let mut profile = self.require(user).await?;
        profile.add_experience(entry.mint());
        self.profiles.save(&profile).await?;

        self.join(profile).await
    }

    /// Remove an experience entry by its identifier.
    pub async fn remove_experience(&self, user: &UserId, entry_id: &str) -> Result<ProfileView> {
        let mut profile = self.require(user).await?;

        if let Ok(id) = Uuid::parse_str(entry_id) {
            if profile.remove_experience(id) {
                self.profiles.save(&profile).await?;
            }
        }

        self.join(profile).await
    }

    /// Add an education entry on top of the list.
    pub async fn add_education(&self, user: &UserId, entry: NewEducation) -> Result<ProfileView> {
        let mut profile = self.require(user).await?;
        profile.add_education(entry.mint());
        self.profiles.save(&profile).await?;

        self.join(profile).await
    }

    /// Remove an education entry by its identifier.
    pub async fn remove_education(&self, user: &UserId, entry_id: &str) -> Result<ProfileView> {
        let mut profile = self.require(user).await?;

        if let Ok(id) = Uuid::parse_str(entry_id) {
            if profile.remove_education(id) {
                self.profiles.save(&profile).await?;
            }
        }

        self.join(profile).await
    }

    async fn require(&self, user: &UserId) -> Result<Profile> {
        self.profiles
            .find_by_user(user)
            .await?
            .ok_or(ServerError::NotFound("profile"))
    }

    async fn join(&self, profile: Profile) -> Result<ProfileView> {
        let user = match self.users.find_by_id(&profile.user).await? {
            Some(user) => UserSummary::from(user),
            None => {
                tracing::warn!(user_id = %profile.user, "profile owner has no user record");
                UserSummary::detached(profile.user.clone())
            },
        };

        Ok(ProfileView { profile, user })
    }
}
