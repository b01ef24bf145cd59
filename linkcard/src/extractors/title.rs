//! Title resolution.

use super::{pick_first, Candidate};
use crate::document::{collapse_whitespace, Document};

/// Title sources in priority order.
#[must_use]
pub fn title_candidates(doc: &Document) -> Vec<Candidate<'_>> {
    vec![
        Candidate::new("og:title", move || doc.meta_property("og:title")),
        Candidate::new("twitter:title", move || {
            doc.meta_name("twitter:title")
                .or_else(|| doc.meta_property("twitter:title"))
        }),
        Candidate::new("og:site_name", move || doc.meta_property("og:site_name")),
        Candidate::new("meta:title", move || doc.meta_name("title")),
        Candidate::new("h1", move || doc.first_text("h1")),
        Candidate::new("title", move || doc.first_text("title")),
    ]
}

/// Resolves the page title. Empty when no source has a value.
#[must_use]
pub fn extract_title(doc: &Document) -> String {
    pick_first(title_candidates(doc))
        .map(|picked| {
            tracing::trace!(source = picked.source, "Title resolved");
            collapse_whitespace(&picked.value)
        })
        .unwrap_or_default()
}
