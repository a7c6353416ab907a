//! skillctl - browse a skills catalog from the terminal
//!
//! Loads the catalog from the first working source, then lists, searches,
//! shows or copies skills, or runs an interactive browser.

use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use serde::Serialize;
use skillctl::browse::Session;
use skillctl::client::{CliError, HttpFetcher};
use skillctl::clipboard::{CommandClipboard, MissingClipboard, PrintClipboard};
use skillctl::render;
use skills_core::browser::{Browser, LoadTicket};
use skills_core::clipboard::{copy_with_fallback, Clipboard};
use skills_core::filter::{self, FilterState};
use skills_core::navigation::Route;
use skills_core::resolve::{fetch_skill_resources, load_catalog};
use skills_core::types::Catalog;
use skills_core::view::{self, CopyTarget, ModalView, PipelineKind, Tab, CATALOG_UNAVAILABLE_MESSAGE};
use skills_core::Config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Terminal browser for the skills catalog.
#[derive(Parser)]
#[command(name = "skillctl")]
#[command(about = "Browse, search and copy skills from the skills catalog")]
#[command(version)]
struct Cli {
    /// Config file path (overrides .skills/config)
    #[arg(long, global = true, env = "SKILLCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog source, tried in the order given (path or URL)
    #[arg(long = "catalog", global = true)]
    catalogs: Vec<String>,

    /// Base for the flat per-skill layout
    #[arg(long, global = true, env = "SKILLCTL_SITE_BASE")]
    site_base: Option<String>,

    /// Repository root for the categorized layout
    #[arg(long, global = true, env = "SKILLCTL_REMOTE_BASE")]
    remote_base: Option<String>,

    /// Output format: text, json, or yaml
    #[arg(long, global = true, default_value = "text", value_parser = parse_output)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List skills (optionally filtered)
    List {
        /// Only this category (or 'all')
        #[arg(long, default_value = "all")]
        category: String,

        /// Only skills with a local backend
        #[arg(long)]
        local: bool,

        /// Only skills that need no credentials
        #[arg(long)]
        no_credentials: bool,
    },

    /// Show categories with skill counts
    Categories,

    /// Search skill names and descriptions
    Search {
        /// Search text
        query: String,

        /// Only this category (or 'all')
        #[arg(long, default_value = "all")]
        category: String,
    },

    /// Show a skill's details
    Show {
        /// Skill name
        name: String,

        /// Detail tab: spec or pipeline
        #[arg(long, default_value = "spec", value_parser = parse_tab)]
        tab: Tab,

        /// Pipeline view: cli or mcp
        #[arg(long, default_value = "cli", value_parser = parse_pipeline)]
        pipeline: PipelineKind,
    },

    /// Copy a skill file or the deploy command to the clipboard
    Copy {
        /// Skill name
        name: String,

        /// What to copy: definition, cli, mcp, or deploy
        #[arg(value_parser = parse_copy_target)]
        target: CopyTarget,
    },

    /// Browse interactively
    Browse {
        /// Starting route, e.g. /skill/<name>
        #[arg(long, default_value = "/")]
        route: String,

        /// Route stashed by a not-found redirect; wins over --route
        #[arg(long, env = "SKILLCTL_REDIRECT")]
        redirect: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn parse_output(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        "yaml" => Ok(OutputFormat::Yaml),
        _ => Err(format!("invalid output format '{s}', expected: text, json, yaml")),
    }
}

fn parse_tab(s: &str) -> Result<Tab, String> {
    match s.to_lowercase().as_str() {
        "spec" => Ok(Tab::Spec),
        "pipeline" => Ok(Tab::Pipeline),
        _ => Err(format!("invalid tab '{s}', expected: spec, pipeline")),
    }
}

fn parse_pipeline(s: &str) -> Result<PipelineKind, String> {
    match s.to_lowercase().as_str() {
        "cli" => Ok(PipelineKind::Cli),
        "mcp" => Ok(PipelineKind::Mcp),
        _ => Err(format!("invalid pipeline '{s}', expected: cli, mcp")),
    }
}

fn parse_copy_target(s: &str) -> Result<CopyTarget, String> {
    match s.to_lowercase().as_str() {
        "definition" | "skill.yaml" => Ok(CopyTarget::Definition),
        "cli" => Ok(CopyTarget::CliPipeline),
        "mcp" => Ok(CopyTarget::McpPipeline),
        "deploy" => Ok(CopyTarget::DeployCommand),
        _ => Err(format!(
            "invalid copy target '{s}', expected: definition, cli, mcp, deploy"
        )),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SKILLCTL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let fetcher = HttpFetcher::new(config.request_timeout())?;
    let catalog = load_catalog(&fetcher, &config.catalog_locations())
        .await
        .map_err(|_| CliError::CatalogUnavailable {
            message: CATALOG_UNAVAILABLE_MESSAGE.to_string(),
        })?;
    let output = cli.output;

    match cli.command {
        Command::List {
            category,
            local,
            no_credentials,
        } => {
            let state = FilterState::default()
                .with_category(category)
                .with_local_only(local)
                .with_no_credentials(no_credentials);
            run_list(&catalog, &state, output)
        }
        Command::Categories => run_categories(&catalog, output),
        Command::Search { query, category } => {
            let state = FilterState::default()
                .with_query(&query)
                .with_category(category);
            run_list(&catalog, &state, output)
        }
        Command::Show {
            name,
            tab,
            pipeline,
        } => run_show(&config, &fetcher, catalog, &name, tab, pipeline, output).await,
        Command::Copy { name, target } => {
            run_copy(&config, &fetcher, catalog, &name, target).await
        }
        Command::Browse { route, redirect } => {
            run_browse(&config, &fetcher, catalog, &route, redirect.as_deref()).await
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let cwd = std::env::current_dir()?;
    let mut config = Config::discover(cli.config.as_deref(), &cwd)?;

    if !cli.catalogs.is_empty() {
        config.catalog_sources.clone_from(&cli.catalogs);
    }
    if let Some(site_base) = &cli.site_base {
        config.apply_value("site_base", site_base)?;
    }
    if let Some(remote_base) = &cli.remote_base {
        config.apply_value("remote_base", remote_base)?;
    }
    Ok(config)
}

fn emit<T: Serialize>(format: OutputFormat, value: &T) -> Result<bool, CliError> {
    let text = match format {
        OutputFormat::Text => return Ok(false),
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))?
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| CliError::Output(e.to_string()))?
        }
    };
    println!("{}", text.trim_end());
    Ok(true)
}

fn run_list(catalog: &Catalog, state: &FilterState, output: OutputFormat) -> Result<(), CliError> {
    let visible = filter::filter_skills(catalog, state);
    let view = view::catalog_view(&visible);
    if emit(output, &view)? {
        return Ok(());
    }

    let summary = render::render_filter(state);
    if !summary.is_empty() {
        println!("{summary}");
    }
    print!("{}", render::render_catalog(&view));
    Ok(())
}

#[derive(Serialize)]
struct CategorySummary<'a> {
    name: &'a str,
    count: usize,
    description: &'a str,
}

fn run_categories(catalog: &Catalog, output: OutputFormat) -> Result<(), CliError> {
    let counts = filter::category_counts(catalog);
    let summaries: Vec<CategorySummary<'_>> = counts
        .iter()
        .map(|(category, count)| CategorySummary {
            name: category.as_str(),
            count: *count,
            description: catalog
                .categories
                .get(category.as_str())
                .map(|info| info.description.as_str())
                .unwrap_or_default(),
        })
        .collect();
    if emit(output, &summaries)? {
        return Ok(());
    }

    print!("{}", render::render_categories(catalog, &counts));
    Ok(())
}

fn skill_not_found(catalog: &Catalog, name: &str) -> CliError {
    CliError::SkillNotFound {
        name: name.to_string(),
        suggestions: catalog.suggest(name).into_iter().map(String::from).collect(),
    }
}

/// Opens `name` in a fresh browser and waits for its resources.
async fn open_loaded(
    config: &Config,
    fetcher: &HttpFetcher,
    catalog: Catalog,
    name: &str,
) -> Result<Browser, CliError> {
    if catalog.get(name).is_none() {
        return Err(skill_not_found(&catalog, name));
    }

    let mut browser = Browser::new(catalog, config.links());
    let ticket: LoadTicket = browser
        .initial_load(Route::Skill(name.to_string()), None)
        .ok_or_else(|| skill_not_found(browser.catalog(), name))?;

    let skill = browser
        .catalog()
        .get(name)
        .cloned()
        .ok_or_else(|| skill_not_found(browser.catalog(), name))?;
    let resources =
        fetch_skill_resources(fetcher, &config.resource_sources(), name, &skill).await;
    browser.complete_load(&ticket, resources);
    Ok(browser)
}

async fn run_show(
    config: &Config,
    fetcher: &HttpFetcher,
    catalog: Catalog,
    name: &str,
    tab: Tab,
    pipeline: PipelineKind,
    output: OutputFormat,
) -> Result<(), CliError> {
    let mut browser = open_loaded(config, fetcher, catalog, name).await?;
    browser.select_tab(tab);
    browser.select_pipeline(pipeline);

    let Some(ModalView::Detail(detail)) = browser.modal_view() else {
        return Err(skill_not_found(browser.catalog(), name));
    };
    if emit(output, &detail)? {
        return Ok(());
    }
    print!("{}", render::render_detail(&detail));
    Ok(())
}

fn system_clipboard(config: &Config) -> Box<dyn Clipboard> {
    match CommandClipboard::detect(config.clipboard_cmd.as_deref()) {
        Some(clipboard) => Box::new(clipboard),
        None => Box::new(MissingClipboard),
    }
}

async fn run_copy(
    config: &Config,
    fetcher: &HttpFetcher,
    catalog: Catalog,
    name: &str,
    target: CopyTarget,
) -> Result<(), CliError> {
    let browser = open_loaded(config, fetcher, catalog, name).await?;
    let text = browser
        .copy_text(target)
        .ok_or_else(|| CliError::NotAvailable {
            name: name.to_string(),
            what: target.as_str().to_string(),
        })?;

    let mut primary = system_clipboard(config);
    let mut fallback = PrintClipboard::stdout();
    let outcome = copy_with_fallback(primary.as_mut(), &mut fallback, &text);
    eprintln!("{}", outcome.message());
    Ok(())
}

async fn run_browse(
    config: &Config,
    fetcher: &HttpFetcher,
    catalog: Catalog,
    route: &str,
    redirect: Option<&str>,
) -> Result<(), CliError> {
    let current = Route::parse(route)?;
    let redirect = redirect.map(Route::parse).transpose()?;

    let mut browser = Browser::new(catalog, config.links());
    let initial = browser.initial_load(current, redirect);

    let sources = config.resource_sources();
    let mut primary = system_clipboard(config);
    let mut fallback = PrintClipboard::stdout();
    let mut session = Session::new(
        browser,
        fetcher,
        &sources,
        config.search_debounce(),
        primary.as_mut(),
        &mut fallback,
    );

    println!("Type 'help' for commands.");
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    session.run(initial, input, &mut stdout).await
}
