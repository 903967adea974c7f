//! Create or update the caller's profile.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::AppState;
use crate::error::Result;
use crate::profile::{ProfileFields, ProfileView, Social, parse_skills};
use crate::router::{Valid, supplied};
use crate::user::UserId;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct Body {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    #[validate(
        required(message = "Status is required."),
        custom(function = "crate::router::not_blank", message = "Status is required.")
    )]
    pub status: Option<String>,
    #[serde(alias = "githubusername")]
    pub github_username: Option<String>,
    /// Comma-separated list.
    #[validate(
        required(message = "Skills is required."),
        custom(function = "valid_skills", message = "Skills is required.")
    )]
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

/// At least one skill must survive splitting.
fn valid_skills(value: &str) -> std::result::Result<(), ValidationError> {
    if parse_skills(value).is_empty() {
        return Err(ValidationError::new("skills"));
    }

    Ok(())
}

impl From<Body> for ProfileFields {
    fn from(body: Body) -> Self {
        ProfileFields {
            company: supplied(body.company),
            website: supplied(body.website),
            location: supplied(body.location),
            bio: supplied(body.bio),
            status: body.status.unwrap_or_default(),
            github_username: supplied(body.github_username),
            skills: body.skills.as_deref().map(parse_skills).unwrap_or_default(),
            social: Social {
                youtube: supplied(body.youtube),
                twitter: supplied(body.twitter),
                facebook: supplied(body.facebook),
                linkedin: supplied(body.linkedin),
                instagram: supplied(body.instagram),
            },
        }
    }
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Valid(body): Valid<Body>,
) -> Result<Json<ProfileView>> {
    Ok(Json(state.profiles.upsert(&user, body.into()).await?))
}
