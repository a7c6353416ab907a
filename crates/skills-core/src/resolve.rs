//! Ordered source resolution for the catalog and per-skill resources.
//!
//! Every lookup is a list of candidate [`Location`]s tried in order. The first
//! one that fetches and parses wins; failures are collected so callers can
//! report them. There is no retry: one pass through the list is final.

use crate::types::{Catalog, Category, Skill};
use futures::future::join4;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// A place a document can be read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    File(PathBuf),
    Url(String),
}

impl Location {
    /// `http://` and `https://` values are URLs, anything else is a path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    /// Appends path segments. URL segments are percent-encoded.
    pub fn join(&self, segments: &[&str]) -> Self {
        match self {
            Self::File(base) => {
                let mut path = base.clone();
                for segment in segments {
                    path.push(segment);
                }
                Self::File(path)
            }
            Self::Url(base) => {
                let mut url = base.trim_end_matches('/').to_string();
                for segment in segments {
                    url.push('/');
                    url.push_str(&urlencoding::encode(segment));
                }
                Self::Url(url)
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Failure of a single candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {location} failed: {message}")]
    Transport { location: String, message: String },
    #[error("{location} returned status {status}")]
    Status { location: String, status: u16 },
    #[error("failed to read {location}: {message}")]
    Io { location: String, message: String },
    #[error("invalid content at {location}: {message}")]
    Invalid { location: String, message: String },
}

impl FetchError {
    pub fn location(&self) -> &str {
        match self {
            Self::Transport { location, .. }
            | Self::Status { location, .. }
            | Self::Io { location, .. }
            | Self::Invalid { location, .. } => location,
        }
    }
}

/// Reads the text behind a [`Location`].
///
/// Implementations must report non-success statuses as errors.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch_text(&self, location: &Location) -> Result<String, FetchError>;
}

/// Outcome of trying an ordered list of candidates.
#[derive(Debug)]
pub enum Resolution<T> {
    Found {
        location: Location,
        value: T,
        /// Candidates that failed before the winning one.
        failures: Vec<FetchError>,
    },
    Exhausted {
        failures: Vec<FetchError>,
    },
}

impl<T> Resolution<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Found { value, .. } => Some(value),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Tries each candidate in order and returns the first that fetches and parses.
pub async fn resolve_first<F, T, P>(fetcher: &F, candidates: &[Location], parse: P) -> Resolution<T>
where
    F: Fetcher,
    P: Fn(&str) -> Result<T, String>,
{
    let mut failures = Vec::new();

    for candidate in candidates {
        let text = match fetcher.fetch_text(candidate).await {
            Ok(text) => text,
            Err(e) => {
                debug!(location = %candidate, error = %e, "candidate failed");
                failures.push(e);
                continue;
            }
        };

        match parse(&text) {
            Ok(value) => {
                return Resolution::Found {
                    location: candidate.clone(),
                    value,
                    failures,
                };
            }
            Err(message) => {
                debug!(location = %candidate, error = %message, "candidate unparseable");
                failures.push(FetchError::Invalid {
                    location: candidate.to_string(),
                    message,
                });
            }
        }
    }

    Resolution::Exhausted { failures }
}

// --- Catalog ---

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: all {} source(s) failed", attempts.len())]
    Unavailable { attempts: Vec<FetchError> },
}

/// Loads the catalog from the first candidate that yields a valid document.
pub async fn load_catalog<F: Fetcher>(fetcher: &F, candidates: &[Location]) -> Result<Catalog, CatalogError> {
    match resolve_first(fetcher, candidates, |text| {
        Catalog::from_json(text).map_err(|e| e.to_string())
    })
    .await
    {
        Resolution::Found {
            location, value, ..
        } => {
            debug!(
                location = %location,
                skills = value.skills.len(),
                "catalog loaded"
            );
            Ok(value)
        }
        Resolution::Exhausted { failures } => {
            for failure in &failures {
                warn!(error = %failure, "catalog source failed");
            }
            Err(CatalogError::Unavailable { attempts: failures })
        }
    }
}

// --- Per-skill resources ---

/// Auxiliary files published next to each skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFile {
    Readme,
    Definition,
    CliPipeline,
    McpPipeline,
}

impl ResourceFile {
    pub const ALL: [ResourceFile; 4] = [
        Self::Readme,
        Self::Definition,
        Self::CliPipeline,
        Self::McpPipeline,
    ];

    pub fn filename(&self) -> &'static str {
        match self {
            Self::Readme => "README.md",
            Self::Definition => "skill.yaml",
            Self::CliPipeline => "pipeline-cli.yaml",
            Self::McpPipeline => "pipeline-mcp.yaml",
        }
    }
}

/// Where per-skill files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSources {
    /// Flat layout: `<site_base>/<name>/<file>`.
    pub site_base: Location,
    /// Categorized layout: `<remote_base>/skills/<category>/<name>/<file>`.
    pub remote_base: Location,
}

impl ResourceSources {
    /// Candidates for one file, flat layout first.
    pub fn candidates(&self, name: &str, category: &Category, file: ResourceFile) -> Vec<Location> {
        vec![
            self.site_base.join(&[name, file.filename()]),
            self.remote_base
                .join(&["skills", category.as_str(), name, file.filename()]),
        ]
    }
}

/// Fetches one auxiliary file. Total failure is `None`, not an error.
pub async fn fetch_resource<F: Fetcher>(
    fetcher: &F,
    sources: &ResourceSources,
    name: &str,
    category: &Category,
    file: ResourceFile,
) -> Option<String> {
    let candidates = sources.candidates(name, category, file);
    let resolution = resolve_first(fetcher, &candidates, |text| Ok(text.to_string())).await;
    if let Resolution::Exhausted { .. } = resolution {
        warn!(skill = name, file = file.filename(), "could not fetch resource");
    }
    resolution.into_value()
}

/// Fetched auxiliary files for one skill; `None` marks an unavailable file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillResources {
    pub readme: Option<String>,
    pub definition: Option<String>,
    pub cli_pipeline: Option<String>,
    pub mcp_pipeline: Option<String>,
}

impl SkillResources {
    pub fn get(&self, file: ResourceFile) -> Option<&str> {
        match file {
            ResourceFile::Readme => self.readme.as_deref(),
            ResourceFile::Definition => self.definition.as_deref(),
            ResourceFile::CliPipeline => self.cli_pipeline.as_deref(),
            ResourceFile::McpPipeline => self.mcp_pipeline.as_deref(),
        }
    }
}

/// Fetches every auxiliary file concurrently and waits for all of them.
pub async fn fetch_skill_resources<F: Fetcher>(
    fetcher: &F,
    sources: &ResourceSources,
    name: &str,
    skill: &Skill,
) -> SkillResources {
    let category = &skill.category;
    let (readme, definition, cli_pipeline, mcp_pipeline) = join4(
        fetch_resource(fetcher, sources, name, category, ResourceFile::Readme),
        fetch_resource(fetcher, sources, name, category, ResourceFile::Definition),
        fetch_resource(fetcher, sources, name, category, ResourceFile::CliPipeline),
        fetch_resource(fetcher, sources, name, category, ResourceFile::McpPipeline),
    )
    .await;

    SkillResources {
        readme,
        definition,
        cli_pipeline,
        mcp_pipeline,
    }
}
