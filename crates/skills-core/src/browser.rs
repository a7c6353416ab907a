//! Catalog browser controller.
//!
//! [`Browser`] owns every piece of mutable UI state: the loaded catalog, the
//! filter values, the modal and the session history. Front ends feed it user
//! events and draw the view-models it returns.
//!
//! Modal transitions:
//! - Closed -> Open(skill): card click, deep link, or initial URL.
//! - Open(a) -> Open(b): navigating to another skill's route.
//! - Open -> Closed: overlay click, escape, or back navigation.
//!
//! Opening hands back a [`LoadTicket`]. Resources fetched for that ticket are
//! applied only if the modal still shows the same open.

use crate::filter::{self, CategoryFilter, FilterState};
use crate::navigation::{History, Route};
use crate::resolve::SkillResources;
use crate::types::{Catalog, Category, Skill};
use crate::view::{self, CatalogView, CopyTarget, Links, ModalView, PipelineKind, Tab};
use tracing::{debug, warn};

/// Resource loading phase inside an open modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready(SkillResources),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenModal {
    pub skill: String,
    pub tab: Tab,
    pub pipeline: PipelineKind,
    pub load: LoadState,
    generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Open(OpenModal),
}

impl ModalState {
    pub fn skill(&self) -> Option<&str> {
        match self {
            Self::Closed => None,
            Self::Open(open) => Some(&open.skill),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

/// Identifies one open of the modal. Hand it back with the fetched resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub skill: String,
    pub category: Category,
    generation: u64,
}

/// How the user asked to close the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Overlay,
    Escape,
    Button,
}

#[derive(Debug)]
pub struct Browser {
    catalog: Catalog,
    links: Links,
    filter: FilterState,
    modal: ModalState,
    history: History,
    generation: u64,
}

impl Browser {
    pub fn new(catalog: Catalog, links: Links) -> Self {
        Self {
            catalog,
            links,
            filter: FilterState::default(),
            modal: ModalState::Closed,
            history: History::default(),
            generation: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    // --- Startup ---

    /// Applies the address the session started on.
    ///
    /// A stashed redirect takes precedence over `current` and is consumed.
    /// Either way the route becomes the single initial history entry, so a
    /// deep link opens its modal without adding an entry.
    pub fn initial_load(&mut self, current: Route, redirect: Option<Route>) -> Option<LoadTicket> {
        let route = redirect.unwrap_or(current);
        self.history = History::new(route.clone());

        match route {
            Route::Root => None,
            Route::Skill(name) => {
                let ticket = self.show(&name);
                if ticket.is_none() {
                    self.history.replace(Route::Root);
                }
                ticket
            }
        }
    }

    // --- Filtering ---

    pub fn visible(&self) -> Vec<(&str, &Skill)> {
        filter::filter_skills(&self.catalog, &self.filter)
    }

    pub fn catalog_view(&self) -> CatalogView {
        view::catalog_view(&self.visible())
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.filter.category = category;
    }

    /// Applies settled search input. Callers debounce keystrokes first.
    pub fn set_query(&mut self, raw: &str) {
        self.filter.set_query(raw);
    }

    pub fn set_local_only(&mut self, local_only: bool) {
        self.filter.local_only = local_only;
    }

    pub fn set_no_credentials(&mut self, no_credentials: bool) {
        self.filter.no_credentials = no_credentials;
    }

    // --- Modal transitions ---

    /// Opens a skill from its card and records a history entry.
    pub fn open(&mut self, name: &str) -> Option<LoadTicket> {
        self.navigate(Route::Skill(name.to_string()))
    }

    /// Follows a route as if typed or linked, recording a history entry.
    pub fn navigate(&mut self, route: Route) -> Option<LoadTicket> {
        if let Route::Skill(name) = &route {
            if self.catalog.get(name).is_none() {
                warn!(skill = %name, "ignoring navigation to unknown skill");
                return None;
            }
        }
        self.history.push(route.clone());
        self.apply_route(&route)
    }

    /// Closes the modal and returns the address to `/`.
    ///
    /// When the entry before the open is the root, this steps back onto it so
    /// a later back does not reopen the modal; otherwise `/` is pushed.
    pub fn close(&mut self, reason: CloseReason) {
        if !self.modal.is_open() {
            return;
        }
        debug!(?reason, skill = ?self.modal.skill(), "closing modal");

        if self.history.previous() == Some(&Route::Root) {
            self.history.back();
        } else {
            self.history.push(Route::Root);
        }
        self.modal = ModalState::Closed;
    }

    /// Back navigation. Returns a ticket if the restored entry opens a skill.
    pub fn back(&mut self) -> Option<LoadTicket> {
        let route = self.history.back()?.clone();
        self.apply_route(&route)
    }

    pub fn forward(&mut self) -> Option<LoadTicket> {
        let route = self.history.forward()?.clone();
        self.apply_route(&route)
    }

    /// Matches the modal to a restored route without touching history.
    fn apply_route(&mut self, route: &Route) -> Option<LoadTicket> {
        match route {
            Route::Root => {
                self.modal = ModalState::Closed;
                None
            }
            Route::Skill(name) => {
                if self.modal.skill() == Some(name.as_str()) {
                    return None;
                }
                let ticket = self.show(name);
                if ticket.is_none() {
                    self.modal = ModalState::Closed;
                }
                ticket
            }
        }
    }

    fn show(&mut self, name: &str) -> Option<LoadTicket> {
        let Some(skill) = self.catalog.get(name) else {
            warn!(skill = %name, "skill not in catalog");
            return None;
        };
        let category = skill.category.clone();

        self.generation += 1;
        self.modal = ModalState::Open(OpenModal {
            skill: name.to_string(),
            tab: Tab::default(),
            pipeline: PipelineKind::default(),
            load: LoadState::Loading,
            generation: self.generation,
        });
        debug!(skill = %name, generation = self.generation, "modal opened");

        Some(LoadTicket {
            skill: name.to_string(),
            category,
            generation: self.generation,
        })
    }

    /// Applies fetched resources if the ticket still matches the open modal.
    ///
    /// Returns false for stale results, which are dropped.
    pub fn complete_load(&mut self, ticket: &LoadTicket, resources: SkillResources) -> bool {
        match &mut self.modal {
            ModalState::Open(open)
                if open.skill == ticket.skill && open.generation == ticket.generation =>
            {
                open.load = LoadState::Ready(resources);
                true
            }
            _ => {
                debug!(skill = %ticket.skill, "discarding stale resources");
                false
            }
        }
    }

    pub fn select_tab(&mut self, tab: Tab) -> bool {
        match &mut self.modal {
            ModalState::Open(open) => {
                open.tab = tab;
                true
            }
            ModalState::Closed => false,
        }
    }

    pub fn select_pipeline(&mut self, pipeline: PipelineKind) -> bool {
        match &mut self.modal {
            ModalState::Open(open) => {
                open.pipeline = pipeline;
                true
            }
            ModalState::Closed => false,
        }
    }

    // --- Views ---

    pub fn modal_view(&self) -> Option<ModalView> {
        let ModalState::Open(open) = &self.modal else {
            return None;
        };
        let skill = self.catalog.get(&open.skill)?;

        Some(match &open.load {
            LoadState::Loading => ModalView::Loading {
                name: open.skill.clone(),
                message: view::LOADING_MESSAGE.to_string(),
            },
            LoadState::Ready(resources) => ModalView::Detail(Box::new(view::detail_view(
                &open.skill,
                skill,
                resources,
                open.tab,
                open.pipeline,
                &self.links,
            ))),
        })
    }

    /// Text for a copy action in the open, loaded modal.
    pub fn copy_text(&self, target: CopyTarget) -> Option<String> {
        match self.modal_view()? {
            ModalView::Detail(detail) => detail.copy_text(target).map(str::to_string),
            ModalView::Loading { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::copy_with_fallback;
    use crate::clipboard::tests::MemoryClipboard;
    use crate::resolve::fetch_skill_resources;
    use crate::resolve::tests::{sources, MockFetcher, CATALOG_JSON};

    fn browser() -> Browser {
        Browser::new(Catalog::from_json(CATALOG_JSON).unwrap(), Links::default())
    }

    fn skill(name: &str) -> Route {
        Route::Skill(name.to_string())
    }

    fn ready() -> SkillResources {
        SkillResources {
            cli_pipeline: Some("input:\n  stdin: {}\noutput:\n  stdout: {}\n".into()),
            ..Default::default()
        }
    }

    #[test]
    fn open_then_back_restores_closed_root() {
        let mut browser = browser();
        assert!(browser.open("alpha").is_some());
        assert_eq!(browser.history().current(), &skill("alpha"));
        assert_eq!(browser.modal().skill(), Some("alpha"));

        assert!(browser.back().is_none());
        assert_eq!(browser.history().current(), &Route::Root);
        assert_eq!(browser.modal(), &ModalState::Closed);
    }

    #[test]
    fn open_x_then_y_then_back_restores_x() {
        let mut browser = browser();
        browser.open("alpha");
        browser.navigate(skill("beta"));
        assert_eq!(browser.modal().skill(), Some("beta"));

        let ticket = browser.back().unwrap();
        assert_eq!(ticket.skill, "alpha");
        assert_eq!(browser.modal().skill(), Some("alpha"));
        assert_eq!(browser.history().current(), &skill("alpha"));
    }

    #[test]
    fn forward_reopens_after_back() {
        let mut browser = browser();
        browser.open("alpha");
        browser.back();
        let ticket = browser.forward().unwrap();
        assert_eq!(ticket.skill, "alpha");
        assert!(browser.modal().is_open());
    }

    #[test]
    fn close_steps_back_onto_root() {
        let mut browser = browser();
        browser.open("alpha");
        browser.close(CloseReason::Escape);
        assert_eq!(browser.modal(), &ModalState::Closed);
        assert_eq!(browser.history().current(), &Route::Root);
        assert!(!browser.history().can_go_back());
        assert!(browser.history().can_go_forward());
    }

    #[test]
    fn close_from_deep_link_pushes_root() {
        let mut browser = browser();
        browser.initial_load(skill("beta"), None);
        browser.close(CloseReason::Overlay);
        assert_eq!(browser.history().current(), &Route::Root);
        assert_eq!(browser.history().len(), 2);

        let ticket = browser.back().unwrap();
        assert_eq!(ticket.skill, "beta");
    }

    #[test]
    fn close_after_switching_skills_lands_on_root() {
        let mut browser = browser();
        browser.open("alpha");
        browser.navigate(skill("beta"));
        browser.close(CloseReason::Button);
        assert_eq!(browser.history().current(), &Route::Root);
        assert!(!browser.modal().is_open());
    }

    #[test]
    fn initial_deep_link_opens_without_new_entry() {
        let mut browser = browser();
        let ticket = browser.initial_load(skill("alpha"), None).unwrap();
        assert_eq!(ticket.skill, "alpha");
        assert_eq!(ticket.category, Category::Ai);
        assert_eq!(browser.history().len(), 1);
        assert_eq!(browser.modal().skill(), Some("alpha"));
    }

    #[test]
    fn initial_redirect_wins_and_is_not_duplicated() {
        let mut browser = browser();
        let ticket = browser.initial_load(Route::Root, Some(skill("beta"))).unwrap();
        assert_eq!(ticket.skill, "beta");
        assert_eq!(browser.history().len(), 1);
        assert_eq!(browser.history().current(), &skill("beta"));
    }

    #[test]
    fn initial_unknown_skill_falls_back_to_root() {
        let mut browser = browser();
        assert!(browser.initial_load(skill("missing"), None).is_none());
        assert_eq!(browser.history().current(), &Route::Root);
        assert!(!browser.modal().is_open());
    }

    #[test]
    fn navigating_to_unknown_skill_changes_nothing() {
        let mut browser = browser();
        browser.open("alpha");
        assert!(browser.navigate(skill("missing")).is_none());
        assert_eq!(browser.modal().skill(), Some("alpha"));
        assert_eq!(browser.history().len(), 2);
    }

    #[test]
    fn modal_shows_loading_until_resources_arrive() {
        let mut browser = browser();
        let ticket = browser.open("alpha").unwrap();
        assert!(matches!(browser.modal_view(), Some(ModalView::Loading { .. })));

        assert!(browser.complete_load(&ticket, ready()));
        let Some(ModalView::Detail(detail)) = browser.modal_view() else {
            panic!("expected detail");
        };
        assert_eq!(detail.header.name, "alpha");
        assert_eq!(detail.active_tab, Tab::Spec);
    }

    #[test]
    fn stale_results_after_close_are_discarded() {
        let mut browser = browser();
        let ticket = browser.open("alpha").unwrap();
        browser.close(CloseReason::Escape);
        assert!(!browser.complete_load(&ticket, ready()));
        assert!(browser.modal_view().is_none());
    }

    #[test]
    fn stale_results_for_previous_open_are_discarded() {
        let mut browser = browser();
        let first = browser.open("alpha").unwrap();
        browser.back();
        let second = browser.open("alpha").unwrap();

        assert!(!browser.complete_load(&first, ready()));
        assert!(matches!(browser.modal_view(), Some(ModalView::Loading { .. })));
        assert!(browser.complete_load(&second, ready()));
    }

    #[test]
    fn tabs_reset_on_reopen() {
        let mut browser = browser();
        browser.open("alpha");
        assert!(browser.select_tab(Tab::Pipeline));
        assert!(browser.select_pipeline(PipelineKind::Mcp));
        browser.close(CloseReason::Escape);
        assert!(!browser.select_tab(Tab::Pipeline));

        browser.open("alpha");
        let ModalState::Open(open) = browser.modal() else {
            panic!("expected open modal");
        };
        assert_eq!(open.tab, Tab::Spec);
        assert_eq!(open.pipeline, PipelineKind::Cli);
    }

    #[test]
    fn filters_drive_catalog_view() {
        let mut browser = browser();
        browser.set_category(CategoryFilter::from("ai"));
        browser.set_local_only(true);
        let CatalogView::Cards { cards, .. } = browser.catalog_view() else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "beta");

        browser.set_query("zzz");
        assert!(matches!(browser.catalog_view(), CatalogView::Empty { .. }));
        browser.set_no_credentials(true);
        assert!(browser.filter().no_credentials);
    }

    #[tokio::test]
    async fn copied_pipeline_matches_fetched_source() {
        let pipeline = "input:\n  stdin: {}\npipeline:\n  processors:\n    - mapping: 'root = this'\n";
        let fetcher = MockFetcher::default().ok("https://skills.example.com/alpha/pipeline-cli.yaml", pipeline);

        let mut browser = browser();
        let ticket = browser.open("alpha").unwrap();
        let skill = browser.catalog().get(&ticket.skill).unwrap().clone();
        let resources = fetch_skill_resources(&fetcher, &sources(), &ticket.skill, &skill).await;
        assert!(browser.complete_load(&ticket, resources));

        let text = browser.copy_text(CopyTarget::CliPipeline).unwrap();
        let mut primary = MemoryClipboard::default();
        let mut fallback = MemoryClipboard::default();
        copy_with_fallback(&mut primary, &mut fallback, &text);

        assert_eq!(primary.contents.as_deref(), Some(pipeline));
        assert_eq!(browser.copy_text(CopyTarget::McpPipeline), None);
    }
}
