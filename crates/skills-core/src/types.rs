//! Core catalog types.
//!
//! These mirror the `catalog.json` document: a skill count, an ordered
//! mapping from skill name to [`Skill`], and optional category summaries.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Backends that run without leaving the user's machine.
pub const LOCAL_BACKENDS: [&str; 2] = ["local", "ollama"];

// --- Enumerations ---

/// Skill category.
///
/// Catalogs name a fixed set of categories. Anything else is carried through
/// as [`Category::Other`] so a single unexpected value does not make the whole
/// catalog unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Ai,
    Security,
    Transforms,
    Utilities,
    Workflows,
    Other(String),
}

impl Category {
    /// All known categories, in display order.
    pub const KNOWN: [Category; 5] = [
        Self::Ai,
        Self::Security,
        Self::Transforms,
        Self::Utilities,
        Self::Workflows,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ai => "ai",
            Self::Security => "security",
            Self::Transforms => "transforms",
            Self::Utilities => "utilities",
            Self::Workflows => "workflows",
            Self::Other(name) => name,
        }
    }

    /// Badge style class for the category, empty for unknown categories.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Self::Ai => "badge-ai",
            Self::Security => "badge-security",
            Self::Transforms => "badge-transforms",
            Self::Utilities => "badge-utilities",
            Self::Workflows => "badge-workflows",
            Self::Other(_) => "",
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ai" => Self::Ai,
            "security" => Self::Security,
            "transforms" => Self::Transforms,
            "utilities" => Self::Utilities,
            "workflows" => Self::Workflows,
            _ => Self::Other(value),
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Skill records ---

/// A declared skill input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Any JSON value; absent when the input has no default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A declared skill output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A credential the skill may need at deploy time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Redundant copy of the catalog key, present in generated catalogs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub category: Category,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub backends: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<Input>,
    #[serde(default)]
    pub outputs: Vec<Output>,
    #[serde(default)]
    pub credentials: Vec<Credential>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Skill {
    /// True if any backend runs locally.
    pub fn is_local(&self) -> bool {
        self.backends.iter().any(|b| is_local_backend(b))
    }

    /// True if at least one credential is marked required.
    pub fn requires_credentials(&self) -> bool {
        self.credentials.iter().any(|c| c.required)
    }
}

/// Reads a scalar as text: numbers and booleans are stringified, null is empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    scalar_text(value.unwrap_or(serde_json::Value::Null))
        .map(Option::unwrap_or_default)
        .map_err(serde::de::Error::custom)
}

/// Reads a list of scalars, dropping null entries. A null list is empty.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        if let Some(text) = scalar_text(value).map_err(serde::de::Error::custom)? {
            out.push(text);
        }
    }
    Ok(out)
}

fn scalar_text(value: serde_json::Value) -> Result<Option<String>, String> {
    use serde_json::Value;
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(format!("expected a string, found {other}")),
    }
}

/// Returns true for backends in [`LOCAL_BACKENDS`].
pub fn is_local_backend(backend: &str) -> bool {
    LOCAL_BACKENDS.contains(&backend)
}

/// Summary of a category as emitted by the catalog builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skill_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

// --- Catalog ---

/// Skills keyed by name, in document order.
///
/// JSON objects carry no ordering guarantee in most maps, but the catalog
/// order is what the card grid shows, so entries are kept as read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillMap(Vec<(String, Skill)>);

impl SkillMap {
    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Inserts or replaces a skill. A replaced skill keeps its position.
    pub fn insert(&mut self, name: String, skill: Skill) {
        if let Some(slot) = self.0.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = skill;
        } else {
            self.0.push((name, skill));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Skill)> {
        self.0.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Skill)> for SkillMap {
    fn from_iter<I: IntoIterator<Item = (String, Skill)>>(iter: I) -> Self {
        let mut map = Self::default();
        for (name, skill) in iter {
            map.insert(name, skill);
        }
        map
    }
}

impl Serialize for SkillMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, skill) in &self.0 {
            map.serialize_entry(name, skill)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SkillMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SkillMapVisitor;

        impl<'de> Visitor<'de> for SkillMapVisitor {
            type Value = SkillMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of skill name to skill")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SkillMap, A::Error> {
                let mut map = SkillMap(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((name, skill)) = access.next_entry::<String, Skill>()? {
                    map.insert(name, skill);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(SkillMapVisitor)
    }
}

/// The full skills index.
///
/// Loaded once and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub total_skills: usize,
    pub skills: SkillMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, CategoryInfo>,
}

/// Maximum number of "did you mean" suggestions.
const MAX_SUGGESTIONS: usize = 5;

impl Catalog {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.skills.get(name)
    }

    /// Names containing `query`, for "did you mean" hints.
    pub fn suggest(&self, query: &str) -> Vec<&str> {
        if query.is_empty() {
            return Vec::new();
        }
        self.skills
            .names()
            .filter(|n| n.contains(query))
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "total_skills": 3,
        "skills": {
            "text-summarize": {
                "name": "text-summarize",
                "category": "ai",
                "description": "Summarize text",
                "version": "1.0.0",
                "backends": ["openai", "ollama"],
                "inputs": [{"name": "text", "type": "string", "required": true}],
                "outputs": [{"name": "summary", "type": "string"}],
                "credentials": [{"name": "OPENAI_API_KEY", "required": false}]
            },
            "json-pretty": {
                "category": "transforms",
                "description": "Pretty-print JSON",
                "version": "0.2.0",
                "backends": ["local"],
                "inputs": [{"name": "indent", "type": "integer", "default": 2}]
            },
            "quantum-thing": {
                "category": "quantum",
                "description": "Unknown category"
            }
        },
        "categories": {
            "ai": {"description": "AI-powered skills", "skill_count": 1, "tags": ["ai"]}
        }
    }"#;

    #[test]
    fn parses_catalog_in_document_order() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.total_skills, 3);
        let names: Vec<_> = catalog.skills.names().collect();
        assert_eq!(names, vec!["text-summarize", "json-pretty", "quantum-thing"]);
        assert_eq!(catalog.categories["ai"].skill_count, 1);
    }

    #[test]
    fn parses_optional_fields() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let pretty = catalog.get("json-pretty").unwrap();
        assert!(pretty.name.is_none());
        assert!(pretty.credentials.is_empty());
        assert_eq!(pretty.inputs[0].kind.as_deref(), Some("integer"));
        assert_eq!(pretty.inputs[0].default, Some(serde_json::json!(2)));
        assert!(!pretty.inputs[0].required);
    }

    #[test]
    fn keeps_unknown_category() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let skill = catalog.get("quantum-thing").unwrap();
        assert_eq!(skill.category, Category::Other("quantum".to_string()));
        assert_eq!(skill.category.as_str(), "quantum");
        assert_eq!(skill.category.badge_class(), "");
        assert!(skill.backends.is_empty());
    }

    #[test]
    fn local_and_credential_predicates() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let summarize = catalog.get("text-summarize").unwrap();
        assert!(summarize.is_local());
        assert!(!summarize.requires_credentials());

        let mut remote = summarize.clone();
        remote.backends = vec!["openai".to_string(), "remote".to_string()];
        remote.credentials[0].required = true;
        assert!(!remote.is_local());
        assert!(remote.requires_credentials());
    }

    #[test]
    fn serializes_skills_in_order() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let json = serde_json::to_string(&catalog).unwrap();
        let summarize = json.find("\"text-summarize\"").unwrap();
        let pretty = json.find("\"json-pretty\"").unwrap();
        assert!(summarize < pretty);
        assert!(json.contains("\"category\":\"quantum\""));
    }

    #[test]
    fn duplicate_keys_keep_first_position() {
        let json = r#"{"skills": {
            "a": {"category": "ai", "description": "first"},
            "b": {"category": "ai"},
            "a": {"category": "ai", "description": "second"}
        }}"#;
        let catalog = Catalog::from_json(json).unwrap();
        let names: Vec<_> = catalog.skills.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(catalog.get("a").unwrap().description, "second");
    }

    #[test]
    fn suggests_names_containing_query() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.suggest("json"), vec!["json-pretty"]);
        assert!(catalog.suggest("").is_empty());
        assert!(catalog.suggest("nothing").is_empty());
    }

    #[test]
    fn numeric_version_is_read_as_text() {
        let json = r#"{"total_skills": 2, "skills": {
            "a": {"category": "ai", "version": 1.0, "backends": ["local", null, 2]},
            "b": {"category": "ai", "version": "2.0.0"}
        }}"#;
        let catalog = Catalog::from_json(json).unwrap();
        let a = catalog.get("a").unwrap();
        assert_eq!(a.version, "1.0");
        assert_eq!(a.backends, vec!["local", "2"]);
        assert_eq!(catalog.get("b").unwrap().version, "2.0.0");
    }

    #[test]
    fn null_description_is_empty() {
        let json = r#"{"total_skills": 2, "skills": {
            "a": {"category": "ai", "description": null, "backends": null,
                  "credentials": [{"name": 42, "required": true}]},
            "b": {"category": "ai", "description": "kept"}
        }}"#;
        let catalog = Catalog::from_json(json).unwrap();
        let a = catalog.get("a").unwrap();
        assert_eq!(a.description, "");
        assert!(a.backends.is_empty());
        assert_eq!(a.credentials[0].name, "42");
        assert_eq!(catalog.get("b").unwrap().description, "kept");
    }

    #[test]
    fn object_version_is_rejected() {
        let json = r#"{"skills": {"a": {"category": "ai", "version": {"major": 1}}}}"#;
        assert!(Catalog::from_json(json).is_err());
    }

    #[test]
    fn rejects_catalog_without_skills() {
        assert!(Catalog::from_json(r#"{"total_skills": 0}"#).is_err());
        assert!(Catalog::from_json("not json").is_err());
    }
}
