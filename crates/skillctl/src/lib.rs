//! skillctl - terminal browser for a skills catalog.

pub mod browse;
pub mod client;
pub mod clipboard;
pub mod render;
