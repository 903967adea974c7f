//! Configuration manager for devhub.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_PORT: u16 = 8080;
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Domain name of current instance. Also used as JWT issuer.
    pub url: String,
    /// Listening port. `PORT` environment variable takes precedence.
    pub port: Option<u16>,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to JsonWebToken configuration.
    #[serde(skip_serializing)]
    pub token: Option<Token>,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to repository lookup on GitHub.
    #[serde(default, skip_serializing)]
    pub github: Github,
    /// Related to OpenTelemetry and Prometheus.
    #[serde(default, skip_serializing)]
    pub telemetry: Telemetry,
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Json Web Token configuration.
///
/// Either `secret` (HS256) or `public_key_pem` (ES384) must be set.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Token {
    pub secret: Option<String>,
    pub public_key_pem: Option<String>,
    /// Only needed to issue tokens, e.g. for local tooling.
    pub private_key_pem: Option<String>,
    /// Update token audience.
    /// Default is `devhub`.
    pub audience: Option<String>,
}

/// GitHub API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Github {
    /// Base URL of the API.
    #[serde(default = "default_github_api")]
    pub api_url: String,
    /// OAuth application client ID.
    pub client_id: Option<String>,
    /// OAuth application secret.
    pub client_secret: Option<String>,
    /// Request timeout, in seconds.
    #[serde(default = "default_github_timeout")]
    pub timeout_secs: u64,
    /// GitHub rejects requests without `User-Agent`.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Github {
    fn default() -> Self {
        Self {
            api_url: default_github_api(),
            client_id: None,
            client_secret: None,
            timeout_secs: default_github_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_github_api() -> String {
    "https://api.github.com".into()
}

fn default_github_timeout() -> u64 {
    5
}

fn default_user_agent() -> String {
    format!("devhub/{VERSION}")
}

/// Telemetry configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// gRPC endpoint of an OTLP collector.
    pub otlp_endpoint: Option<String>,
    /// Expose `GET /metrics` for Prometheus.
    #[serde(default)]
    pub metrics: bool,
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Instance version, set at read time.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Port to listen on.
    pub fn port(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .or(self.port)
            .unwrap_or(DEFAULT_PORT)
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.to_string())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(file_path) {
            Ok(file) => {
                let mut config: Configuration =
                    match serde_yaml::from_reader(file) {
                        Ok(config) => config,
                        Err(err) => {
                            return Ok(Arc::new(self.error(err)));
                        },
                    };

                config.version = VERSION.to_owned();

                if !config.url.is_empty() {
                    config.url = self.normalize_url(&config.url)?;
                }
                config.github.api_url = self
                    .normalize_url(&config.github.api_url)?
                    .trim_end_matches('/')
                    .to_owned();

                Ok(Arc::new(config))
            },
            Err(err) => Ok(Arc::new(self.error(err))),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found");
        Self {
            version: VERSION.to_owned(),
            ..Default::default()
        }
    }
}
