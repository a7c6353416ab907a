pub mod browser;
pub mod clipboard;
pub mod config;
pub mod debounce;
pub mod filter;
pub mod navigation;
pub mod resolve;
pub mod types;
pub mod view;

pub use browser::{Browser, CloseReason, LoadTicket, ModalState};
pub use config::Config;
pub use filter::{CategoryFilter, FilterState};
pub use navigation::{History, Route};
pub use resolve::{CatalogError, FetchError, Fetcher, Location, ResourceSources, SkillResources};
pub use types::*;
