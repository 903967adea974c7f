use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::AppState;
use crate::error::Result;
use crate::profile::ProfileView;
use crate::user::UserId;

/// Profile of the authenticated user.
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> Result<Json<ProfileView>> {
    Ok(Json(state.profiles.get(&user).await?))
}

/// Every profile, oldest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProfileView>>> {
    Ok(Json(state.profiles.list().await?))
}

pub async fn handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>> {
    Ok(Json(state.profiles.get_by_raw_id(&user_id).await?))
}
