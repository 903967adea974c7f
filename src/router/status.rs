//! Public instance status.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::config::Configuration;

/// Structured status.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Status {
    name: String,
    version: String,
}

/// Instance name and running version.
pub async fn status(State(config): State<Arc<Configuration>>) -> Json<Status> {
    let name = if config.name.is_empty() {
        env!("CARGO_CRATE_NAME").to_owned()
    } else {
        config.name.clone()
    };

    Json(Status {
        name,
        version: env!("CARGO_PKG_VERSION").into(),
    })
}
