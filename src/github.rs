//! Public repository lookup on GitHub.
//!
//! Read-only pass-through: the raw JSON body is handed back untouched and a
//! failure here never touches local state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use url::Url;

use crate::config::Github;
use crate::error::{Result, ServerError};

const PER_PAGE: &str = "5";

/// Errors raised while building a [`GithubClient`].
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("invalid GitHub API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("GitHub API URL cannot be a base")]
    CannotBeABase,
    #[error("cannot build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Port for the third-party repository lookup.
#[async_trait]
pub trait RepositoryLookup: Send + Sync {
    /// Raw JSON list of the public repositories of `username`.
    async fn repositories(&self, username: &str) -> Result<String>;
}

/// GitHub REST API client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_url: Url,
    credentials: Option<(String, String)>,
}

impl GithubClient {
    /// Create a new [`GithubClient`].
    pub fn new(config: &Github) -> std::result::Result<Self, LookupError> {
        let api_url = Url::parse(&config.api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(LookupError::CannotBeABase);
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let credentials = config
            .client_id
            .clone()
            .zip(config.client_secret.clone());

        Ok(Self {
            client,
            api_url,
            credentials,
        })
    }

    fn repositories_url(&self, username: &str) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServerError::Internal {
                details: "GitHub API URL cannot be a base".into(),
                source: None,
            })?
            .pop_if_empty()
            .extend(["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", PER_PAGE)
            .append_pair("sort", "created")
            .append_pair("direction", "asc");

        Ok(url)
    }
}

#[async_trait]
impl RepositoryLookup for GithubClient {
    async fn repositories(&self, username: &str) -> Result<String> {
        let url = self.repositories_url(username)?;

        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json");
        if let Some((id, secret)) = &self.credentials {
            request = request.basic_auth(id, Some(secret));
        }

        let response = request
            .send()
            .await
            .map_err(ServerError::UpstreamUnavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServerError::Upstream {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(ServerError::UpstreamUnavailable)
    }
}
