//! Testing utilities for link extraction.
//!
//! This module provides:
//! - An HTML page builder for fixtures
//! - A canned-page fetcher
//! - An observer that records callbacks

mod fixtures;
mod mocks;

pub use fixtures::{open_graph_page, PageBuilder};
pub use mocks::{CollectingObserver, ObservedEvent, StaticFetcher};
