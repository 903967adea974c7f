use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::AppState;
use crate::error::Result;

/// Public repositories of a GitHub user, as returned by GitHub.
pub async fn handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse> {
    let body = state.github.repositories(&username).await?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}
