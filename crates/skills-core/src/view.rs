//! View-models for the card grid and the skill detail modal.
//!
//! Rendering is split in two: functions here turn catalog data into plain
//! serializable structures, and front ends (terminal text, JSON) draw them.
//! Nothing in this module performs I/O.

use crate::resolve::SkillResources;
use crate::types::{is_local_backend, Credential, Input, Output, Skill};
use serde::{Deserialize, Serialize};

pub const NO_RESULTS_MESSAGE: &str = "No skills found matching your criteria.";
pub const LOADING_MESSAGE: &str = "Loading skill details...";
pub const CATALOG_UNAVAILABLE_MESSAGE: &str =
    "Failed to load skills. Please check your connection and try again.";

/// Input names shown on a card before collapsing into `+N`.
const CARD_INPUT_LIMIT: usize = 2;

const CLI_PIPELINE_DESCRIPTION: &str =
    "Standalone CLI pipeline. Reads from stdin, processes data, outputs to stdout.";
const MCP_PIPELINE_DESCRIPTION: &str =
    "HTTP server pipeline for MCP integration. Exposes an endpoint for AI assistants.";
const DEPLOY_DESCRIPTION: &str = "Deploy this skill to your Expanso Cloud instance. It will run on your Expanso Edge nodes and be available to OpenClaw via MCP.";
const CLOUD_STEPS: [&str; 5] = [
    "Open cloud.expanso.io and sign in",
    "Navigate to Pipelines → Add Pipeline",
    "Paste the Pipeline URL above",
    "Configure any required credentials",
    "Deploy to your Edge nodes",
];

/// Templates for links and commands shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Public host serving `<name>/<file>`.
    pub public_base: String,
    /// Source browser root; skills live under `skills/<category>/<name>`.
    pub source_base: String,
    /// Placeholder endpoint written into the deploy command.
    pub deploy_endpoint: String,
}

impl Default for Links {
    fn default() -> Self {
        Self {
            public_base: "https://skills.expanso.io".to_string(),
            source_base: "https://github.com/expanso-io/expanso-skills/tree/main".to_string(),
            deploy_endpoint: "https://your-instance.us1.cloud.expanso.io".to_string(),
        }
    }
}

impl Links {
    /// Public URL for a skill file, as users paste it into deploy tooling.
    pub fn public_url(&self, name: &str, filename: &str) -> String {
        format!("{}/{}/{}", self.public_base.trim_end_matches('/'), name, filename)
    }

    pub fn source_url(&self, name: &str, skill: &Skill) -> String {
        format!(
            "{}/skills/{}/{}",
            self.source_base.trim_end_matches('/'),
            skill.category,
            name
        )
    }

    pub fn deploy_command(&self, name: &str) -> String {
        format!(
            "# Set your Expanso Cloud endpoint\nexport EXPANSO_CLI_ENDPOINT=\"{}\"\n\n# Deploy the skill\nexpanso-cli job deploy {}",
            self.deploy_endpoint,
            self.public_url(name, "pipeline-cli.yaml")
        )
    }
}

// --- Shared pieces ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStyle {
    Category,
    Local,
    Version,
    Backend,
    LocalBackend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub label: String,
    pub style: BadgeStyle,
    /// Style class for category badges.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class: String,
}

impl Badge {
    fn new(label: impl Into<String>, style: BadgeStyle) -> Self {
        Self {
            label: label.into(),
            style,
            class: String::new(),
        }
    }

    fn category(skill: &Skill) -> Self {
        Self {
            label: skill.category.to_string(),
            style: BadgeStyle::Category,
            class: skill.category.badge_class().to_string(),
        }
    }
}

/// Short label for a backend icon.
pub fn backend_icon(backend: &str) -> String {
    match backend {
        "openai" => "AI".to_string(),
        "ollama" => "OL".to_string(),
        "local" => "L".to_string(),
        "remote" => "R".to_string(),
        other => other
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default(),
    }
}

// --- Card grid ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendIcon {
    pub backend: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub name: String,
    pub description: String,
    pub badges: Vec<Badge>,
    /// First input names, then `+N` for the rest.
    pub input_tags: Vec<String>,
    pub backends: Vec<BackendIcon>,
    /// Route that opens this card's detail.
    pub route: String,
}

/// The card grid; an empty result is a placeholder, never an empty grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogView {
    Cards { count: usize, cards: Vec<CardView> },
    Empty { message: String },
}

pub fn card_view(name: &str, skill: &Skill) -> CardView {
    let mut badges = vec![Badge::category(skill)];
    if skill.is_local() {
        badges.push(Badge::new("local", BadgeStyle::Local));
    }

    let mut input_tags: Vec<String> = skill
        .inputs
        .iter()
        .take(CARD_INPUT_LIMIT)
        .map(|i| i.name.clone())
        .collect();
    if skill.inputs.len() > CARD_INPUT_LIMIT {
        input_tags.push(format!("+{}", skill.inputs.len() - CARD_INPUT_LIMIT));
    }

    CardView {
        name: name.to_string(),
        description: skill.description.clone(),
        badges,
        input_tags,
        backends: skill
            .backends
            .iter()
            .map(|b| BackendIcon {
                backend: b.clone(),
                icon: backend_icon(b),
            })
            .collect(),
        route: crate::navigation::Route::Skill(name.to_string()).path(),
    }
}

/// Builds the full grid, replacing whatever was shown before.
pub fn catalog_view(visible: &[(&str, &Skill)]) -> CatalogView {
    if visible.is_empty() {
        return CatalogView::Empty {
            message: NO_RESULTS_MESSAGE.to_string(),
        };
    }

    CatalogView::Cards {
        count: visible.len(),
        cards: visible
            .iter()
            .map(|(name, skill)| card_view(name, skill))
            .collect(),
    }
}

// --- Detail modal ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Spec,
    Pipeline,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spec => "spec",
            Self::Pipeline => "pipeline",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Spec => "Spec",
            Self::Pipeline => "Pipeline",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    #[default]
    Cli,
    Mcp,
}

impl PipelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Mcp => "mcp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cli => "CLI Pipeline",
            Self::Mcp => "MCP Pipeline",
        }
    }
}

/// Text that a copy action can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyTarget {
    Definition,
    CliPipeline,
    McpPipeline,
    DeployCommand,
}

impl CopyTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::CliPipeline => "cli",
            Self::McpPipeline => "mcp",
            Self::DeployCommand => "deploy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    /// Rendered as inline code.
    #[serde(default)]
    pub code: bool,
}

impl Cell {
    fn code(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: true,
        }
    }

    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// A fetched text block, or an explicit "not available" placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    Code { language: String, text: String },
    Unavailable { message: String },
}

impl Content {
    fn from_resource(text: Option<&str>, language: &str, missing: &str) -> Self {
        match text {
            Some(text) => Self::Code {
                language: language.to_string(),
                text: text.to_string(),
            },
            None => Self::Unavailable {
                message: missing.to_string(),
            },
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Code { text, .. } => Some(text),
            Self::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderView {
    pub name: String,
    pub description: String,
    pub badges: Vec<Badge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecTabView {
    pub tables: Vec<TableView>,
    pub documentation: Content,
    pub definition: Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePane {
    pub kind: PipelineKind,
    pub label: String,
    pub description: String,
    pub content: Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployView {
    pub description: String,
    pub pipeline_url: String,
    pub command: String,
    pub cloud_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTabView {
    pub active: PipelineKind,
    pub panes: Vec<PipelinePane>,
    pub deploy: DeployView,
}

impl PipelineTabView {
    pub fn pane(&self, kind: PipelineKind) -> Option<&PipelinePane> {
        self.panes.iter().find(|p| p.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterView {
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailView {
    pub header: HeaderView,
    pub active_tab: Tab,
    pub spec: SpecTabView,
    pub pipeline: PipelineTabView,
    pub footer: FooterView,
}

impl DetailView {
    /// Exact text a copy action places on the clipboard.
    pub fn copy_text(&self, target: CopyTarget) -> Option<&str> {
        match target {
            CopyTarget::Definition => self.spec.definition.text(),
            CopyTarget::CliPipeline => self.pipeline.pane(PipelineKind::Cli)?.content.text(),
            CopyTarget::McpPipeline => self.pipeline.pane(PipelineKind::Mcp)?.content.text(),
            CopyTarget::DeployCommand => Some(&self.pipeline.deploy.command),
        }
    }
}

/// What the modal shows: a loading phase, then the detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModalView {
    Loading { name: String, message: String },
    Detail(Box<DetailView>),
}

fn input_table(inputs: &[Input]) -> TableView {
    TableView {
        title: "Inputs".to_string(),
        headers: vec![
            "Name".into(),
            "Type".into(),
            "Required".into(),
            "Default".into(),
            "Description".into(),
        ],
        rows: inputs
            .iter()
            .map(|input| {
                vec![
                    Cell::code(&input.name),
                    Cell::plain(input.kind.as_deref().unwrap_or("any")),
                    Cell::plain(yes_no(input.required)),
                    Cell::code(
                        input
                            .default
                            .as_ref()
                            .map_or_else(|| "-".to_string(), ToString::to_string),
                    ),
                    Cell::plain(input.description.as_deref().unwrap_or_default()),
                ]
            })
            .collect(),
    }
}

fn output_table(outputs: &[Output]) -> TableView {
    TableView {
        title: "Outputs".to_string(),
        headers: vec!["Name".into(), "Type".into(), "Description".into()],
        rows: outputs
            .iter()
            .map(|output| {
                vec![
                    Cell::code(&output.name),
                    Cell::plain(output.kind.as_deref().unwrap_or("any")),
                    Cell::plain(output.description.as_deref().unwrap_or_default()),
                ]
            })
            .collect(),
    }
}

fn credential_table(credentials: &[Credential]) -> TableView {
    TableView {
        title: "Credentials".to_string(),
        headers: vec!["Name".into(), "Required".into(), "Description".into()],
        rows: credentials
            .iter()
            .map(|cred| {
                vec![
                    Cell::code(&cred.name),
                    Cell::plain(yes_no(cred.required)),
                    Cell::plain(cred.description.as_deref().unwrap_or_default()),
                ]
            })
            .collect(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Builds the detail modal for a skill whose resources have all settled.
pub fn detail_view(
    name: &str,
    skill: &Skill,
    resources: &SkillResources,
    tab: Tab,
    pipeline: PipelineKind,
    links: &Links,
) -> DetailView {
    let mut badges = vec![
        Badge::category(skill),
        Badge::new(format!("v{}", skill.version), BadgeStyle::Version),
    ];
    for backend in &skill.backends {
        let style = if is_local_backend(backend) {
            BadgeStyle::LocalBackend
        } else {
            BadgeStyle::Backend
        };
        badges.push(Badge::new(backend.clone(), style));
    }

    let mut tables = Vec::new();
    if !skill.inputs.is_empty() {
        tables.push(input_table(&skill.inputs));
    }
    if !skill.outputs.is_empty() {
        tables.push(output_table(&skill.outputs));
    }
    if !skill.credentials.is_empty() {
        tables.push(credential_table(&skill.credentials));
    }

    let spec = SpecTabView {
        tables,
        documentation: Content::from_resource(
            resources.readme.as_deref(),
            "markdown",
            "Documentation not available for this skill.",
        ),
        definition: Content::from_resource(
            resources.definition.as_deref(),
            "yaml",
            "Skill definition not available for this skill.",
        ),
    };

    let panes = vec![
        PipelinePane {
            kind: PipelineKind::Cli,
            label: PipelineKind::Cli.label().to_string(),
            description: CLI_PIPELINE_DESCRIPTION.to_string(),
            content: Content::from_resource(
                resources.cli_pipeline.as_deref(),
                "yaml",
                "CLI pipeline not available for this skill.",
            ),
        },
        PipelinePane {
            kind: PipelineKind::Mcp,
            label: PipelineKind::Mcp.label().to_string(),
            description: MCP_PIPELINE_DESCRIPTION.to_string(),
            content: Content::from_resource(
                resources.mcp_pipeline.as_deref(),
                "yaml",
                "MCP pipeline not available for this skill.",
            ),
        },
    ];

    let deploy = DeployView {
        description: DEPLOY_DESCRIPTION.to_string(),
        pipeline_url: links.public_url(name, "pipeline-cli.yaml"),
        command: links.deploy_command(name),
        cloud_steps: CLOUD_STEPS.iter().map(|s| (*s).to_string()).collect(),
    };

    DetailView {
        header: HeaderView {
            name: name.to_string(),
            description: skill.description.clone(),
            badges,
            tags: skill.tags.clone(),
        },
        active_tab: tab,
        spec,
        pipeline: PipelineTabView {
            active: pipeline,
            panes,
            deploy,
        },
        footer: FooterView {
            source_url: links.source_url(name, skill),
        },
    }
}
