//! Delete profile and the account owning it.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::user::UserId;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    msg: String,
}

/// Posts written by the user are kept.
pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> Result<Json<Response>> {
    state.profiles.delete_with_account(&user).await?;

    Ok(Json(Response {
        msg: "User deleted".into(),
    }))
}
