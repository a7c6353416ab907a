//! Routes and session history for deep-linkable skill pages.
//!
//! `/` is the closed state and `/skill/<name>` is a skill's detail page.
//! [`History`] is a browser-style entry list with a cursor: pushing drops any
//! forward entries, back/forward only move the cursor.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const SKILL_PREFIX: &str = "/skill/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("invalid skill name in route: {0}")]
    InvalidName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Route {
    Root,
    Skill(String),
}

impl Route {
    /// Parses a path, ignoring any query string or fragment.
    pub fn parse(path: &str) -> Result<Self, NavigationError> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();

        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let normalized = normalized.trim_end_matches('/');

        if normalized.is_empty() || normalized == "/index.html" {
            return Ok(Self::Root);
        }

        let Some(encoded) = normalized.strip_prefix(SKILL_PREFIX) else {
            return Err(NavigationError::UnknownRoute(path.to_string()));
        };

        let name = urlencoding::decode(encoded)
            .map_err(|_| NavigationError::InvalidName(encoded.to_string()))?;
        if name.is_empty() || name.contains('/') {
            return Err(NavigationError::InvalidName(name.into_owned()));
        }

        Ok(Self::Skill(name.into_owned()))
    }

    /// Canonical path for the route.
    pub fn path(&self) -> String {
        match self {
            Self::Root => "/".to_string(),
            Self::Skill(name) => format!("{SKILL_PREFIX}{}", urlencoding::encode(name)),
        }
    }

    pub fn skill(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Skill(name) => Some(name),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<Route>,
    cursor: usize,
}

impl History {
    pub fn new(initial: Route) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Route {
        &self.entries[self.cursor]
    }

    /// The entry `back` would restore.
    pub fn previous(&self) -> Option<&Route> {
        self.cursor.checked_sub(1).map(|i| &self.entries[i])
    }

    /// Adds an entry after the current one, discarding forward entries.
    ///
    /// Pushing the current route again is a no-op.
    pub fn push(&mut self, route: Route) {
        if *self.current() == route {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(route);
        self.cursor += 1;
    }

    /// Rewrites the current entry in place.
    pub fn replace(&mut self, route: Route) {
        self.entries[self.cursor] = route;
    }

    pub fn back(&mut self) -> Option<&Route> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&Route> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Route::Root)
    }
}
