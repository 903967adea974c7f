//! Profile-related HTTP API.
mod delete;
pub mod education;
pub mod experience;
mod get;
mod github;
pub mod upsert;

use axum::routing::{delete, get, post, put};
use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::authenticate;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // `GET /profile/me` goes to `get::me`. Authorization required.
        .route("/me", get(get::me))
        // `POST /profile` goes to `upsert`. Authorization required.
        .route("/", post(upsert::handler))
        // `DELETE /profile` goes to `delete`. Authorization required.
        .route("/", delete(delete::handler))
        .route("/experience", put(experience::add))
        .route("/experience/{exp_id}", delete(experience::remove))
        .route("/education", put(education::add))
        .route("/education/{edu_id}", delete(education::remove))
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    Router::new()
        // `GET /profile` goes to `get::list`.
        .route("/", get(get::list))
        // `GET /profile/user/:ID` goes to `get`.
        .route("/user/{user_id}", get(get::handler))
        // `GET /profile/github/:USERNAME` goes to `github`.
        .route("/github/{username}", get(github::handler))
        .merge(protected)
}
