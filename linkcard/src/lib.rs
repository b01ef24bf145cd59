//! # Linkcard
//!
//! Link metadata and asset extraction for project cards.
//!
//! Given a URL, linkcard fetches the page once and derives:
//!
//! - **Title and description**: social-card tags first, then standard meta
//!   tags, then document content
//! - **Preview image**: social-card images, content images, then any large
//!   or non-decorative image
//! - **Favicon**: icon link tags with a `/favicon.ico` fallback
//! - **Technologies**: CMS, framework and CSS library signatures
//!
//! Requests to private networks are refused before any connection is made.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linkcard::prelude::*;
//!
//! let extractor = CardExtractor::new(ExtractorConfig::default())?;
//! let card = extractor.extract("https://example.com/blog/launch").await?;
//! println!("{} ({:?})", card.title, card.image_url);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod document;
pub mod engine;
pub mod errors;
pub mod extractors;
pub mod fetcher;
pub mod observability;
pub mod result;
pub mod technology;
pub mod testing;
pub mod url_resolver;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        ExtractorConfig, FetchConfig, FieldLimits, ImageConfig, LocalHostPolicy, LogFormat,
        LoggingConfig, TechnologyConfig,
    };
    pub use crate::engine::CardExtractor;
    pub use crate::errors::{ErrorCode, ExtractionError};
    pub use crate::fetcher::{FetchedPage, HttpFetcher, ImageProbe, NetworkGuard, PageFetcher};
    pub use crate::observability::{
        init_tracing, ExtractionObserver, LoggingObserver, NoOpObserver,
    };
    pub use crate::result::ExtractionResult;
}

/// Extracts a card from `url` with the default configuration.
pub async fn extract(url: &str) -> Result<result::ExtractionResult, errors::ExtractionError> {
    engine::CardExtractor::new(config::ExtractorConfig::default())?
        .extract(url)
        .await
}
