//! Middlewares for routes.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::AppState;
use crate::error::{Result, ServerError};

const BEARER: &str = "Bearer ";
/// Header used by older clients instead of `Authorization`.
pub const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

/// Extract the raw token from request headers, if any.
///
/// An `Authorization` header without a token falls back to
/// [`LEGACY_TOKEN_HEADER`].
fn token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(|value| value.strip_prefix(BEARER).unwrap_or(value).trim())
        .filter(|token| !token.is_empty() && *token != BEARER.trim_end())
        .or_else(|| {
            headers
                .get(LEGACY_TOKEN_HEADER)
                .and_then(|header| header.to_str().ok())
                .map(str::trim)
                .filter(|token| !token.is_empty())
        })
}

/// Custom middleware for authentication.
///
/// Rejects the request before any handler runs when the token is missing or
/// invalid; otherwise exposes the caller's [`crate::user::UserId`] as an
/// extension.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let user_id = token(req.headers())
        .and_then(|token| state.token.verify(token))
        .ok_or(ServerError::Unauthorized)?;

    req.extensions_mut().insert(user_id);

    Ok(next.run(req).await)
}
