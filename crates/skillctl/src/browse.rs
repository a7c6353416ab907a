//! Interactive catalog browser.
//!
//! Reads one command per line and redraws the affected view. Search input is
//! debounced, and skill resources load in the background while further
//! commands are accepted; results for a modal that has since changed are
//! dropped by [`Browser::complete_load`].

use crate::client::CliError;
use crate::render;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use skills_core::browser::{Browser, CloseReason, LoadTicket};
use skills_core::clipboard::{copy_with_fallback, Clipboard};
use skills_core::debounce::Debouncer;
use skills_core::filter::CategoryFilter;
use skills_core::navigation::Route;
use skills_core::resolve::{fetch_skill_resources, Fetcher, ResourceSources, SkillResources};
use skills_core::view::{CopyTarget, ModalView, PipelineKind, Tab};
use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

pub const HELP: &str = "\
Commands:
  search <text>      filter by name or description (also: /<text>)
  category <name>    filter by category, or 'all'
  local [on|off]     only skills with a local backend
  nocreds [on|off]   only skills without required credentials
  list               show the current results
  open <name>        open a skill
  go <path>          follow a route such as /skill/<name> or /
  tab spec|pipeline  switch the detail tab
  pipeline cli|mcp   switch the pipeline view
  copy <target>      copy definition, cli, mcp or deploy
  close, esc         close the open skill
  back, forward      move through history
  where              print the current route
  help               show this help
  quit               exit
";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Category(CategoryFilter),
    /// `None` toggles.
    LocalOnly(Option<bool>),
    NoCredentials(Option<bool>),
    List,
    Open(String),
    Go(Route),
    Tab(Tab),
    Pipeline(PipelineKind),
    Copy(CopyTarget),
    Close(CloseReason),
    Back,
    Forward,
    Where,
    Help,
    Quit,
}

/// Parses a command line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(query) = line.strip_prefix('/') {
        return Ok(Some(Command::Search(query.to_string())));
    }

    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "search" | "s" => Command::Search(arg.to_string()),
        "category" | "cat" => {
            if arg.is_empty() {
                return Err("usage: category <name|all>".to_string());
            }
            Command::Category(CategoryFilter::from(arg))
        }
        "local" => Command::LocalOnly(parse_toggle(arg)?),
        "nocreds" => Command::NoCredentials(parse_toggle(arg)?),
        "list" | "ls" => Command::List,
        "open" | "o" => {
            if arg.is_empty() {
                return Err("usage: open <name>".to_string());
            }
            Command::Open(arg.to_string())
        }
        "go" => Command::Go(Route::parse(arg).map_err(|e| e.to_string())?),
        "tab" => Command::Tab(match arg {
            "spec" => Tab::Spec,
            "pipeline" => Tab::Pipeline,
            _ => return Err("usage: tab spec|pipeline".to_string()),
        }),
        "pipeline" => Command::Pipeline(match arg {
            "cli" => PipelineKind::Cli,
            "mcp" => PipelineKind::Mcp,
            _ => return Err("usage: pipeline cli|mcp".to_string()),
        }),
        "copy" | "cp" => Command::Copy(match arg {
            "definition" | "def" | "skill.yaml" => CopyTarget::Definition,
            "cli" => CopyTarget::CliPipeline,
            "mcp" => CopyTarget::McpPipeline,
            "deploy" => CopyTarget::DeployCommand,
            _ => return Err("usage: copy definition|cli|mcp|deploy".to_string()),
        }),
        "close" | "x" => Command::Close(CloseReason::Button),
        "esc" | "escape" => Command::Close(CloseReason::Escape),
        "dismiss" => Command::Close(CloseReason::Overlay),
        "back" | "b" => Command::Back,
        "forward" | "f" => Command::Forward,
        "where" | "pwd" => Command::Where,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

fn parse_toggle(arg: &str) -> Result<Option<bool>, String> {
    match arg.to_lowercase().as_str() {
        "" => Ok(None),
        "on" | "yes" | "true" => Ok(Some(true)),
        "off" | "no" | "false" => Ok(Some(false)),
        other => Err(format!("invalid toggle '{other}', expected: on, off")),
    }
}

/// What the loop does after a command.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Load(LoadTicket),
    Quit,
}

type Loaded = (LoadTicket, SkillResources);

/// An interactive session over one [`Browser`].
pub struct Session<'a, F> {
    browser: Browser,
    fetcher: &'a F,
    sources: &'a ResourceSources,
    clipboard: &'a mut dyn Clipboard,
    fallback: &'a mut dyn Clipboard,
    search: Debouncer<String>,
}

impl<F> fmt::Debug for Session<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("browser", &self.browser)
            .field("clipboard", &self.clipboard.name())
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

impl<'a, F: Fetcher> Session<'a, F> {
    pub fn new(
        browser: Browser,
        fetcher: &'a F,
        sources: &'a ResourceSources,
        debounce: Duration,
        clipboard: &'a mut dyn Clipboard,
        fallback: &'a mut dyn Clipboard,
    ) -> Self {
        Self {
            browser,
            fetcher,
            sources,
            clipboard,
            fallback,
            search: Debouncer::new(debounce),
        }
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Runs until `quit` or end of input.
    ///
    /// `initial` is the ticket from [`Browser::initial_load`], if the session
    /// started on a skill route. At end of input a pending search is applied
    /// and outstanding loads are awaited.
    pub async fn run<R, W>(
        &mut self,
        initial: Option<LoadTicket>,
        input: R,
        out: &mut W,
    ) -> Result<(), CliError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut loads: FuturesUnordered<LocalBoxFuture<'a, Loaded>> = FuturesUnordered::new();

        self.draw_catalog(out)?;
        if let Some(ticket) = initial {
            self.draw_current(out)?;
            self.queue(&mut loads, ticket);
        }

        let mut lines = input.lines();
        loop {
            let deadline = self.search.deadline();
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    match parse_command(&line) {
                        Ok(None) => {}
                        Ok(Some(command)) => match self.handle(command, out)? {
                            Step::Continue => {}
                            Step::Load(ticket) => self.queue(&mut loads, ticket),
                            Step::Quit => return Ok(()),
                        },
                        Err(message) => writeln!(out, "{message}")?,
                    }
                }
                Some((ticket, resources)) = loads.next(), if !loads.is_empty() => {
                    self.finish_load(&ticket, resources, out)?;
                }
                () = tokio::time::sleep_until(tokio::time::Instant::from_std(
                    deadline.unwrap_or_else(Instant::now),
                )), if deadline.is_some() => {
                    if let Some(query) = self.search.poll(Instant::now()) {
                        self.apply_search(&query, out)?;
                    }
                }
            }
        }

        if let Some(query) = self.search.flush() {
            self.apply_search(&query, out)?;
        }
        while let Some((ticket, resources)) = loads.next().await {
            self.finish_load(&ticket, resources, out)?;
        }
        Ok(())
    }

    fn queue(&self, loads: &mut FuturesUnordered<LocalBoxFuture<'a, Loaded>>, ticket: LoadTicket) {
        let Some(skill) = self.browser.catalog().get(&ticket.skill).cloned() else {
            return;
        };
        let fetcher = self.fetcher;
        let sources = self.sources;
        debug!(skill = %ticket.skill, "loading resources");
        loads.push(
            async move {
                let resources = fetch_skill_resources(fetcher, sources, &ticket.skill, &skill).await;
                (ticket, resources)
            }
            .boxed_local(),
        );
    }

    fn finish_load<W: Write>(
        &mut self,
        ticket: &LoadTicket,
        resources: SkillResources,
        out: &mut W,
    ) -> Result<(), CliError> {
        if self.browser.complete_load(ticket, resources) {
            self.draw_modal(out)?;
        }
        Ok(())
    }

    fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Step, CliError> {
        match command {
            Command::Search(query) => self.search.input(query, Instant::now()),
            Command::Category(category) => {
                self.browser.set_category(category);
                self.draw_catalog(out)?;
            }
            Command::LocalOnly(value) => {
                let value = value.unwrap_or(!self.browser.filter().local_only);
                self.browser.set_local_only(value);
                self.draw_catalog(out)?;
            }
            Command::NoCredentials(value) => {
                let value = value.unwrap_or(!self.browser.filter().no_credentials);
                self.browser.set_no_credentials(value);
                self.draw_catalog(out)?;
            }
            Command::List => self.draw_catalog(out)?,
            Command::Open(name) => return self.go(Route::Skill(name), out),
            Command::Go(route) => return self.go(route, out),
            Command::Tab(tab) => {
                if self.browser.select_tab(tab) {
                    self.draw_modal(out)?;
                } else {
                    writeln!(out, "no skill open")?;
                }
            }
            Command::Pipeline(kind) => {
                if self.browser.select_pipeline(kind) {
                    self.draw_modal(out)?;
                } else {
                    writeln!(out, "no skill open")?;
                }
            }
            Command::Copy(target) => self.copy(target, out)?,
            Command::Close(reason) => {
                if self.browser.modal().is_open() {
                    self.browser.close(reason);
                    self.draw_current(out)?;
                }
            }
            Command::Back => {
                if !self.browser.history().can_go_back() {
                    writeln!(out, "nothing to go back to")?;
                    return Ok(Step::Continue);
                }
                let ticket = self.browser.back();
                self.draw_current(out)?;
                return Ok(ticket.map_or(Step::Continue, Step::Load));
            }
            Command::Forward => {
                if !self.browser.history().can_go_forward() {
                    writeln!(out, "nothing to go forward to")?;
                    return Ok(Step::Continue);
                }
                let ticket = self.browser.forward();
                self.draw_current(out)?;
                return Ok(ticket.map_or(Step::Continue, Step::Load));
            }
            Command::Where => writeln!(out, "{}", self.browser.history().current())?,
            Command::Help => write!(out, "{HELP}")?,
            Command::Quit => return Ok(Step::Quit),
        }
        Ok(Step::Continue)
    }

    fn go<W: Write>(&mut self, route: Route, out: &mut W) -> Result<Step, CliError> {
        if let Route::Skill(name) = &route {
            if self.browser.catalog().get(name).is_none() {
                let err = CliError::SkillNotFound {
                    name: name.clone(),
                    suggestions: self
                        .browser
                        .catalog()
                        .suggest(name)
                        .into_iter()
                        .map(String::from)
                        .collect(),
                };
                writeln!(out, "{err}")?;
                return Ok(Step::Continue);
            }
        }

        let ticket = self.browser.navigate(route);
        self.draw_current(out)?;
        Ok(ticket.map_or(Step::Continue, Step::Load))
    }

    fn copy<W: Write>(&mut self, target: CopyTarget, out: &mut W) -> Result<(), CliError> {
        let Some(text) = self.browser.copy_text(target) else {
            match self.browser.modal_view() {
                None => writeln!(out, "no skill open")?,
                Some(ModalView::Loading { .. }) => writeln!(out, "still loading, try again shortly")?,
                Some(ModalView::Detail(_)) => {
                    writeln!(out, "{} not available for this skill", target.as_str())?;
                }
            }
            return Ok(());
        };

        let outcome = copy_with_fallback(&mut *self.clipboard, &mut *self.fallback, &text);
        writeln!(out, "{}", outcome.message())?;
        Ok(())
    }

    fn apply_search<W: Write>(&mut self, query: &str, out: &mut W) -> Result<(), CliError> {
        self.browser.set_query(query);
        self.draw_catalog(out)
    }

    // --- Drawing ---

    fn draw_catalog<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let summary = render::render_filter(self.browser.filter());
        if !summary.is_empty() {
            writeln!(out, "{summary}")?;
        }
        write!(out, "{}", render::render_catalog(&self.browser.catalog_view()))?;
        Ok(())
    }

    fn draw_modal<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        if let Some(view) = self.browser.modal_view() {
            write!(out, "{}", render::render_modal(&view))?;
        }
        Ok(())
    }

    /// Prints the route, then whatever it shows.
    fn draw_current<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        writeln!(out, "[{}]", self.browser.history().current())?;
        if self.browser.modal().is_open() {
            self.draw_modal(out)
        } else {
            self.draw_catalog(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{MissingClipboard, PrintClipboard};
    use skills_core::resolve::{FetchError, Location};
    use skills_core::types::Catalog;
    use skills_core::view::Links;
    use std::collections::HashMap;

    const CATALOG: &str = r#"{"total_skills": 2, "skills": {
        "alpha": {"category": "ai", "description": "First skill", "version": "1.0.0", "backends": ["openai"]},
        "beta": {"category": "ai", "description": "Second skill", "version": "2.0.0", "backends": ["local"]}
    }}"#;

    #[derive(Default)]
    struct MapFetcher(HashMap<String, String>);

    impl Fetcher for MapFetcher {
        async fn fetch_text(&self, location: &Location) -> Result<String, FetchError> {
            self.0
                .get(&location.to_string())
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    location: location.to_string(),
                    status: 404,
                })
        }
    }

    fn fetcher() -> MapFetcher {
        let mut files = HashMap::new();
        files.insert(
            "https://skills.example.com/alpha/pipeline-cli.yaml".to_string(),
            "input:\n  stdin: {}\n".to_string(),
        );
        MapFetcher(files)
    }

    fn sources() -> ResourceSources {
        ResourceSources {
            site_base: Location::parse("https://skills.example.com"),
            remote_base: Location::parse("https://raw.example.com/skills/main"),
        }
    }

    fn browser() -> Browser {
        Browser::new(Catalog::from_json(CATALOG).unwrap(), Links::default())
    }

    async fn run_script(script: &str, debounce: Duration) -> String {
        let fetcher = fetcher();
        let sources = sources();
        let mut clipboard = MissingClipboard;
        let mut fallback = PrintClipboard::new(Vec::new());
        let mut session = Session::new(browser(), &fetcher, &sources, debounce, &mut clipboard, &mut fallback);

        let mut out = Vec::new();
        session.run(None, script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("/ JSON "), Ok(Some(Command::Search(" JSON".into()))));
        assert_eq!(parse_command("search foo bar"), Ok(Some(Command::Search("foo bar".into()))));
        assert_eq!(
            parse_command("category security"),
            Ok(Some(Command::Category(CategoryFilter::Only("security".into()))))
        );
        assert_eq!(parse_command("category all"), Ok(Some(Command::Category(CategoryFilter::All))));
        assert_eq!(parse_command("local"), Ok(Some(Command::LocalOnly(None))));
        assert_eq!(parse_command("nocreds off"), Ok(Some(Command::NoCredentials(Some(false)))));
        assert_eq!(
            parse_command("go /skill/alpha"),
            Ok(Some(Command::Go(Route::Skill("alpha".into()))))
        );
        assert_eq!(parse_command("copy deploy"), Ok(Some(Command::Copy(CopyTarget::DeployCommand))));
        assert_eq!(parse_command("esc"), Ok(Some(Command::Close(CloseReason::Escape))));
        assert_eq!(parse_command("QUIT"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(parse_command("teleport").is_err());
        assert!(parse_command("open").is_err());
        assert!(parse_command("tab source").is_err());
        assert!(parse_command("local maybe").is_err());
        assert!(parse_command("go /nowhere").is_err());
    }

    #[tokio::test]
    async fn rapid_searches_apply_only_the_last() {
        let out = run_script("search a\nsearch al\nsearch alp\n", Duration::from_secs(60)).await;
        assert_eq!(out.matches("Filters:").count(), 1);
        assert!(out.contains("search=\"alp\""));
        assert!(out.ends_with("1 skill(s)\n"));
    }

    #[tokio::test]
    async fn open_loads_resources_in_background() {
        let out = run_script("open alpha\ntab pipeline\n", Duration::ZERO).await;
        assert!(out.contains("[/skill/alpha]"));
        assert!(out.contains("[Pipeline]"));
        assert!(out.contains("```yaml\ninput:\n  stdin: {}\n```"));
    }

    #[tokio::test]
    async fn unknown_skill_suggests_names() {
        let out = run_script("open alp\n", Duration::ZERO).await;
        assert!(out.contains("skill not found: alp\n  → did you mean: alpha"));
    }

    #[tokio::test]
    async fn close_returns_to_root_and_forward_reopens() {
        let out = run_script("open beta\nclose\nback\nforward\nwhere\nquit\nopen alpha\n", Duration::ZERO).await;
        assert!(out.contains("[/]\n"));
        assert!(out.contains("nothing to go back to"));
        assert_eq!(out.matches("[/skill/beta]").count(), 2);
        assert!(out.contains("\n/skill/beta\n"));
        assert!(!out.contains("[/skill/alpha]"));
    }

    #[tokio::test]
    async fn copy_falls_back_to_printing() {
        let fetcher = fetcher();
        let sources = sources();
        let mut clipboard = MissingClipboard;
        let mut fallback = PrintClipboard::new(Vec::new());
        let mut out = Vec::new();

        {
            let mut session =
                Session::new(browser(), &fetcher, &sources, Duration::ZERO, &mut clipboard, &mut fallback);

            session.handle(Command::Copy(CopyTarget::DeployCommand), &mut out).unwrap();
            let Step::Load(ticket) = session.handle(Command::Open("alpha".into()), &mut out).unwrap() else {
                panic!("expected a load");
            };
            session.handle(Command::Copy(CopyTarget::DeployCommand), &mut out).unwrap();

            let skill = session.browser().catalog().get("alpha").unwrap().clone();
            let resources = fetch_skill_resources(&fetcher, &sources, "alpha", &skill).await;
            session.finish_load(&ticket, resources, &mut out).unwrap();
            session.handle(Command::Copy(CopyTarget::McpPipeline), &mut out).unwrap();
            session.handle(Command::Copy(CopyTarget::DeployCommand), &mut out).unwrap();
        }

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("no skill open\n"));
        assert!(out.contains("still loading, try again shortly"));
        assert!(out.contains("mcp not available for this skill"));
        assert!(out.ends_with("Clipboard unavailable; text printed above.\n"));

        let printed = String::from_utf8(fallback.into_inner()).unwrap();
        assert!(printed.starts_with("----- copy below -----\n# Set your Expanso Cloud endpoint\n"));
        assert!(printed.contains("expanso-cli job deploy https://skills.expanso.io/alpha/pipeline-cli.yaml\n"));
    }

    #[tokio::test]
    async fn failed_copy_is_reported_without_error() {
        let fetcher = fetcher();
        let sources = sources();
        let mut clipboard = MissingClipboard;
        let mut fallback = MissingClipboard;
        let mut out = Vec::new();

        {
            let mut session =
                Session::new(browser(), &fetcher, &sources, Duration::ZERO, &mut clipboard, &mut fallback);
            let Step::Load(ticket) = session.handle(Command::Open("alpha".into()), &mut out).unwrap() else {
                panic!("expected a load");
            };
            let skill = session.browser().catalog().get("alpha").unwrap().clone();
            let resources = fetch_skill_resources(&fetcher, &sources, "alpha", &skill).await;
            session.finish_load(&ticket, resources, &mut out).unwrap();
            session.handle(Command::Copy(CopyTarget::DeployCommand), &mut out).unwrap();
        }

        let out = String::from_utf8(out).unwrap();
        assert!(out.ends_with("Failed to copy.\n"));
    }
}
