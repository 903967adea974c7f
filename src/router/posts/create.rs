use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::post::Post;
use crate::router::Valid;
use crate::user::UserId;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(
        required(message = "Text is required."),
        custom(function = "crate::router::not_blank", message = "Text is required.")
    )]
    pub text: Option<String>,
}

/// Handler to publish a post.
pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Post>)> {
    let post = state
        .posts
        .create(&user, body.text.unwrap_or_default())
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}
