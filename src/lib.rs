//! devhub is a backend for developer profiles and a small post feed.
#![forbid(unsafe_code)]

pub mod config;
pub mod database;
pub mod error;
pub mod github;
mod middleware;
pub mod post;
pub mod profile;
mod router;
pub mod telemetry;
pub mod token;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderName, Method, StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};

use crate::database::Database;
use crate::database::memory::MemoryStore;
use crate::github::{GithubClient, RepositoryLookup};
use crate::post::PostService;
use crate::profile::ProfileService;
use crate::token::TokenManager;

/// Identity every authenticated test request is issued for.
#[cfg(test)]
pub const TEST_USER: &str = "alice";

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    state: Option<&AppState>,
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let token = match state {
        Some(state) => format!(
            "Bearer {}",
            state.token.create(TEST_USER).expect("cannot create JWT")
        ),
        None => String::default(),
    };

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, token)
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub token: TokenManager,
    pub github: Arc<dyn RepositoryLookup>,
    pub profiles: ProfileService,
    pub posts: PostService,
}

impl AppState {
    /// Create a new [`AppState`], wiring services to `db`.
    pub fn new(
        config: Arc<config::Configuration>,
        db: Database,
        token: TokenManager,
        github: Arc<dyn RepositoryLookup>,
    ) -> Self {
        let profiles = ProfileService::new(Arc::clone(&db.profiles), Arc::clone(&db.users));
        let posts = PostService::new(Arc::clone(&db.posts), Arc::clone(&db.users));

        Self {
            config,
            token,
            github,
            profiles,
            posts,
        }
    }
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(
                    DefaultOnResponse::new()
                        .include_headers(true)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
            HeaderName::from_static(middleware::LEGACY_TOKEN_HEADER),
        ]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        .nest("/posts", router::posts::router(state.clone()))
        .nest("/profile", router::profile::router(state.clone()))
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: Arc<config::Configuration>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let db = match config.postgres {
        Some(ref config) => {
            Database::new(
                &config.address,
                config
                    .username
                    .as_deref()
                    .unwrap_or(database::DEFAULT_CREDENTIALS),
                config
                    .password
                    .as_deref()
                    .unwrap_or(database::DEFAULT_CREDENTIALS),
                config
                    .database
                    .as_deref()
                    .unwrap_or(database::DEFAULT_DATABASE_NAME),
                config.pool_size.unwrap_or(database::DEFAULT_POOL_SIZE),
            )
            .await?
        },
        None => {
            tracing::warn!(
                "missing `postgres` entry on `config.yaml` file, data will not survive a restart"
            );
            Database::memory(MemoryStore::default())
        },
    };

    // handle jwt.
    let Some(token) = &config.token else {
        return Err("missing `token` entry on `config.yaml` file".into());
    };
    let token = TokenManager::from_config(&config.url, token)?;

    let github = GithubClient::new(&config.github)?;

    Ok(AppState::new(
        Arc::clone(&config),
        db,
        token,
        Arc::new(github),
    ))
}
