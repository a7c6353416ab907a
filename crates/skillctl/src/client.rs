//! Fetching catalog documents over HTTP or from disk.
//!
//! [`HttpFetcher`] backs the ordered source lists in `skills_core::resolve`:
//! URLs go through `reqwest`, anything else is read as a local file.

use skills_core::resolve::{FetchError, Fetcher, Location};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    CatalogUnavailable { message: String },

    #[error("skill not found: {name}{}", format_suggestions(.suggestions))]
    SkillNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("{what} not available for {name}")]
    NotAvailable { name: String, what: String },

    #[error("config error: {0}")]
    Config(#[from] skills_core::config::ConfigError),

    #[error("invalid route: {0}")]
    Route(#[from] skills_core::navigation::NavigationError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("output error: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("\n  → did you mean: {}", suggestions.join(", "))
    }
}

/// Reads [`Location`]s: URLs over HTTP, paths from the filesystem.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, CliError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skillctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CliError::HttpClient(e.to_string()))?;
        Ok(Self { http })
    }

    async fn fetch_url(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| transport_error(url, &e))
    }
}

fn transport_error(location: &str, e: &reqwest::Error) -> FetchError {
    FetchError::Transport {
        location: location.to_string(),
        message: e.to_string(),
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, location: &Location) -> Result<String, FetchError> {
        debug!(location = %location, "fetching");
        match location {
            Location::Url(url) => self.fetch_url(url).await,
            Location::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| FetchError::Io {
                        location: path.display().to_string(),
                        message: e.to_string(),
                    })
            }
        }
    }
}
