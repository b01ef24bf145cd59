//! Description resolution.

use super::{pick_first, Candidate};
use crate::document::{collapse_whitespace, Document};

/// Description sources in priority order.
#[must_use]
pub fn description_candidates(doc: &Document) -> Vec<Candidate<'_>> {
    vec![
        Candidate::new("og:description", move || doc.meta_property("og:description")),
        Candidate::new("twitter:description", move || {
            doc.meta_name("twitter:description")
                .or_else(|| doc.meta_property("twitter:description"))
        }),
        Candidate::new("meta:description", move || doc.meta_name("description")),
        Candidate::new("og:summary", move || doc.meta_property("og:summary")),
        Candidate::new("article-paragraph", move || doc.first_text("article p:first-of-type")),
        Candidate::new("main-paragraph", move || doc.first_text("main p:first-of-type")),
    ]
}

/// Resolves the page description. Empty when no source has a value.
#[must_use]
pub fn extract_description(doc: &Document) -> String {
    pick_first(description_candidates(doc))
        .map(|picked| {
            tracing::trace!(source = picked.source, "Description resolved");
            collapse_whitespace(&picked.value)
        })
        .unwrap_or_default()
}
