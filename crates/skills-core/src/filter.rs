//! Filter engine: derives the visible skills from the catalog and filter state.
//!
//! The visible set is a pure function of `(Catalog, FilterState)`. All active
//! predicates must hold for a skill to be shown, and the result keeps the
//! catalog's order.

use crate::types::{Catalog, Category, Skill};
use serde::{Deserialize, Serialize};

/// Sentinel category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Category selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Only(category) => category,
        }
    }

    /// Exact string equality, except `All` which matches everything.
    pub fn matches(&self, category: &Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category.as_str(),
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        if value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Only(value)
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        match value {
            CategoryFilter::All => ALL_CATEGORIES.to_string(),
            CategoryFilter::Only(category) => category,
        }
    }
}

/// User-controlled filter values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub category: CategoryFilter,
    /// Search text, stored lower-cased and trimmed.
    query: String,
    /// Only skills with a `local` or `ollama` backend.
    pub local_only: bool,
    /// Hide skills that require at least one credential.
    pub no_credentials: bool,
}

impl FilterState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, raw: &str) {
        self.query = normalize_query(raw);
    }

    pub fn with_query(mut self, raw: &str) -> Self {
        self.set_query(raw);
        self
    }

    pub fn with_category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_local_only(mut self, local_only: bool) -> Self {
        self.local_only = local_only;
        self
    }

    pub fn with_no_credentials(mut self, no_credentials: bool) -> Self {
        self.no_credentials = no_credentials;
        self
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.category == CategoryFilter::All
            && self.query.is_empty()
            && !self.local_only
            && !self.no_credentials
    }
}

/// Lower-cases and trims raw search input.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Checks a single skill against every active predicate.
pub fn matches(name: &str, skill: &Skill, state: &FilterState) -> bool {
    if !state.category.matches(&skill.category) {
        return false;
    }

    if !state.query.is_empty() {
        let haystack = format!("{} {}", name, skill.description).to_lowercase();
        if !haystack.contains(&state.query) {
            return false;
        }
    }

    if state.local_only && !skill.is_local() {
        return false;
    }

    if state.no_credentials && skill.requires_credentials() {
        return false;
    }

    true
}

/// Returns the visible skills in catalog order.
pub fn filter_skills<'a>(catalog: &'a Catalog, state: &FilterState) -> Vec<(&'a str, &'a Skill)> {
    catalog
        .skills
        .iter()
        .filter(|(name, skill)| matches(name, skill, state))
        .collect()
}

/// Number of skills per category, known categories first.
///
/// Known categories are always listed, even with zero skills. Unknown
/// categories follow in order of first appearance.
pub fn category_counts(catalog: &Catalog) -> Vec<(Category, usize)> {
    let mut counts: Vec<(Category, usize)> = Category::KNOWN.iter().map(|c| (c.clone(), 0)).collect();

    for (_, skill) in catalog.skills.iter() {
        if let Some(entry) = counts.iter_mut().find(|(c, _)| *c == skill.category) {
            entry.1 += 1;
        } else {
            counts.push((skill.category.clone(), 1));
        }
    }

    counts
}
