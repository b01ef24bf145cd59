//! Preview image selection.
//!
//! Structured metadata is trusted first, then images inside content
//! containers, then a scan of every `<img>` that skips small images and
//! filenames that look like site chrome.

use regex::Regex;
use scraper::ElementRef;
use std::sync::OnceLock;
use url::Url;

use super::{pick_first, Candidate};
use crate::config::ImageConfig;
use crate::document::Document;
use crate::url_resolver::resolve;

const CONTENT_IMAGE_SELECTORS: [&str; 8] = [
    "article img",
    "main img",
    ".content img",
    ".post img",
    ".entry-content img",
    "[role=\"main\"] img",
    ".article-body img",
    ".post-content img",
];

const SOURCE_ATTRS: [&str; 3] = ["src", "data-src", "data-lazy-src"];

/// Image sources in priority order. Every value is already resolved against
/// `base`.
#[must_use]
pub fn image_candidates<'a>(
    doc: &'a Document,
    base: &'a Url,
    config: &'a ImageConfig,
) -> Vec<Candidate<'a>> {
    let absolute = move |raw: Option<String>| raw.map(|v| resolve(base, &v));

    let mut candidates = vec![
        Candidate::new("og:image:secure_url", move || {
            absolute(doc.meta_property("og:image:secure_url"))
        }),
        Candidate::new("og:image:url", move || absolute(doc.meta_property("og:image:url"))),
        Candidate::new("og:image", move || absolute(doc.meta_property("og:image"))),
        Candidate::new("twitter:image:src", move || {
            absolute(
                doc.meta_name("twitter:image:src")
                    .or_else(|| doc.meta_property("twitter:image:src")),
            )
        }),
        Candidate::new("twitter:image", move || {
            absolute(
                doc.meta_name("twitter:image")
                    .or_else(|| doc.meta_property("twitter:image")),
            )
        }),
        Candidate::new("itemprop:image", move || absolute(doc.meta_itemprop("image"))),
        Candidate::new("link:image_src", move || absolute(doc.link_href("image_src"))),
    ];

    for selector in CONTENT_IMAGE_SELECTORS {
        candidates.push(Candidate::new("content-image", move || {
            let img = doc.first(selector)?;
            absolute(first_attr(&img, &SOURCE_ATTRS[..2]))
        }));
    }

    candidates.push(Candidate::new("page-image", move || {
        doc.select("img")
            .iter()
            .find_map(|img| page_image_source(img, config))
            .and_then(|src| absolute(Some(src)))
    }));

    candidates
}

/// Resolves the preview image URL.
#[must_use]
pub fn extract_image(doc: &Document, base: &Url, config: &ImageConfig) -> Option<String> {
    let picked = pick_first(image_candidates(doc, base, config))?;
    tracing::trace!(source = picked.source, url = %picked.value, "Image resolved");
    Some(picked.value)
}

/// Source of an arbitrary page image if it looks like content: declared
/// larger than the icon threshold, or a URL free of chrome-like patterns.
fn page_image_source(img: &ElementRef<'_>, config: &ImageConfig) -> Option<String> {
    let src = first_attr(img, &SOURCE_ATTRS)?;

    let el = img.value();
    let width = el.attr("width").and_then(leading_number).unwrap_or(0);
    let height = el.attr("height").and_then(leading_number).unwrap_or(0);
    if width > config.min_dimension || height > config.min_dimension {
        return Some(src);
    }

    if looks_like_chrome(&src, &config.excluded_patterns) {
        None
    } else {
        Some(src)
    }
}

fn first_attr(img: &ElementRef<'_>, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|name| img.value().attr(name))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Logos, icons, avatars and SVGs.
fn looks_like_chrome(src: &str, patterns: &[String]) -> bool {
    let lower = src.to_ascii_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    path.ends_with(".svg")
        || patterns
            .iter()
            .any(|p| !p.is_empty() && lower.contains(&p.to_ascii_lowercase()))
}

/// Integer prefix of a dimension attribute, e.g. `"300px"` -> 300.
fn leading_number(value: &str) -> Option<u32> {
    static LEADING_DIGITS: OnceLock<Option<Regex>> = OnceLock::new();
    let re = LEADING_DIGITS
        .get_or_init(|| Regex::new(r"^\s*(\d{1,9})").ok())
        .as_ref()?;
    re.captures(value)?.get(1)?.as_str().parse().ok()
}
