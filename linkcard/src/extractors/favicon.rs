//! Favicon resolution.

use url::Url;

use super::{pick_first, Candidate};
use crate::document::Document;
use crate::url_resolver::resolve;

const DEFAULT_FAVICON_PATH: &str = "/favicon.ico";

/// Favicon sources in priority order, ending with the conventional path.
/// Values are resolved against `base`.
#[must_use]
pub fn favicon_candidates<'a>(doc: &'a Document, base: &'a Url) -> Vec<Candidate<'a>> {
    let link = move |rel: &'static str| {
        Candidate::new(rel, move || doc.link_href(rel).map(|href| resolve(base, &href)))
    };

    vec![
        link("icon"),
        link("shortcut icon"),
        link("apple-touch-icon"),
        link("apple-touch-icon-precomposed"),
        Candidate::new("default", move || Some(resolve(base, DEFAULT_FAVICON_PATH))),
    ]
}

/// Resolves the favicon URL. `None` only when nothing, not even the default
/// path, resolves against `base`.
#[must_use]
pub fn extract_favicon(doc: &Document, base: &Url) -> Option<String> {
    let picked = pick_first(favicon_candidates(doc, base))?;
    tracing::trace!(source = picked.source, url = %picked.value, "Favicon resolved");
    Some(picked.value)
}
