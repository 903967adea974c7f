//! Posts-related HTTP API. Every route requires authentication.
pub mod create;
mod get;

use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::authenticate;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // `POST /posts` goes to `create`.
        .route("/", post(create::handler))
        // `GET /posts` goes to `list`.
        .route("/", get(get::list))
        // `GET /posts/:ID` goes to `get`.
        .route("/{post_id}", get(get::handler))
        .route_layer(middleware::from_fn_with_state(state, authenticate))
}
