//! Signature-based technology detection.
//!
//! Every table below is evaluated independently against the document, so a
//! page can match any number of entries. Shared naming conventions (an
//! `#app` root, a `px-` class) make false positives possible; labels are
//! hints for a project card, not an audit.

use indexmap::IndexSet;

use crate::config::TechnologyConfig;
use crate::document::Document;

/// `generator` meta content substring -> label. Matched case-insensitively.
pub const GENERATOR_SIGNATURES: &[(&str, &str)] = &[
    ("wordpress", "WordPress"),
    ("drupal", "Drupal"),
    ("joomla", "Joomla"),
    ("squarespace", "Squarespace"),
    ("wix", "Wix"),
    ("shopify", "Shopify"),
    ("ghost", "Ghost"),
    ("hugo", "Hugo"),
    ("gatsby", "Gatsby"),
    ("jekyll", "Jekyll"),
    ("webflow", "Webflow"),
    ("hexo", "Hexo"),
    ("docusaurus", "Docusaurus"),
    ("astro", "Astro"),
];

/// Stylesheet `href` or inline `<style>` substring -> label.
pub const STYLESHEET_SIGNATURES: &[(&str, &str)] = &[
    ("bootstrap", "Bootstrap"),
    ("tailwind", "Tailwind CSS"),
    ("bulma", "Bulma"),
    ("materialize", "Materialize"),
    ("foundation", "Foundation"),
];

/// A structural signature: any matching selector or raw-HTML marker flags
/// the label.
#[derive(Debug, Clone, Copy)]
pub struct MarkupSignature {
    /// Reported technology name.
    pub label: &'static str,
    /// CSS selectors, any match counts.
    pub selectors: &'static [&'static str],
    /// Case-sensitive substrings of the raw HTML.
    pub markers: &'static [&'static str],
}

/// Build-tool script paths and bootstrap payloads of meta-frameworks.
pub const SCRIPT_SIGNATURES: &[MarkupSignature] = &[
    MarkupSignature {
        label: "Next.js",
        selectors: &[r#"script[src*="/_next/"]"#],
        markers: &["__NEXT_DATA__"],
    },
    MarkupSignature {
        label: "Nuxt",
        selectors: &[r#"script[src*="/_nuxt/"]"#],
        markers: &["__NUXT__"],
    },
    MarkupSignature {
        label: "Gatsby",
        selectors: &[],
        markers: &["___gatsby"],
    },
    MarkupSignature {
        label: "Remix",
        selectors: &[],
        markers: &["__remixContext"],
    },
    MarkupSignature {
        label: "Svelte",
        selectors: &[],
        markers: &["__svelte", "svelte-"],
    },
];

/// Root-mount ids and directive attributes of UI frameworks.
pub const DOM_SIGNATURES: &[MarkupSignature] = &[
    MarkupSignature {
        label: "React",
        selectors: &["#root", "#__next", "[data-reactroot]"],
        markers: &[],
    },
    MarkupSignature {
        label: "Vue.js",
        selectors: &["#app", "[v-cloak]", "[data-v-app]"],
        markers: &[],
    },
    MarkupSignature {
        label: "Angular",
        selectors: &["[ng-app]", "[ng-controller]", "[ng-model]", "[ng-version]"],
        markers: &[],
    },
];

/// Class patterns typical of utility-first CSS.
pub const UTILITY_CLASS_SELECTORS: &str =
    r#"[class*="flex"], [class*="grid"], [class*="px-"], [class*="py-"]"#;

/// Label reported when utility class density exceeds the threshold.
pub const UTILITY_FRAMEWORK_LABEL: &str = "Tailwind CSS";

/// Scans a document for technology signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnologyDetector {
    config: TechnologyConfig,
}

impl TechnologyDetector {
    /// Creates a detector.
    #[must_use]
    pub fn new(config: TechnologyConfig) -> Self {
        Self { config }
    }

    /// Returns the detected labels, deduplicated, in table order.
    #[must_use]
    pub fn detect(&self, doc: &Document) -> Vec<String> {
        let mut found: IndexSet<&'static str> = IndexSet::new();

        if let Some(generator) = doc.meta_name("generator") {
            let generator = generator.to_lowercase();
            found.extend(
                GENERATOR_SIGNATURES
                    .iter()
                    .filter(|(needle, _)| generator.contains(needle))
                    .map(|(_, label)| *label),
            );
        }

        for signature in SCRIPT_SIGNATURES.iter().chain(DOM_SIGNATURES) {
            if matches_markup(doc, signature) {
                found.insert(signature.label);
            }
        }

        let styles = stylesheet_text(doc);
        found.extend(
            STYLESHEET_SIGNATURES
                .iter()
                .filter(|(needle, _)| styles.contains(needle))
                .map(|(_, label)| *label),
        );

        if doc.count(UTILITY_CLASS_SELECTORS) > self.config.utility_class_threshold {
            found.insert(UTILITY_FRAMEWORK_LABEL);
        }

        found.into_iter().map(str::to_string).collect()
    }
}

fn matches_markup(doc: &Document, signature: &MarkupSignature) -> bool {
    signature.selectors.iter().any(|sel| doc.exists(sel))
        || signature
            .markers
            .iter()
            .any(|marker| doc.raw_html().contains(marker))
}

/// Lowercased stylesheet hrefs and inline style bodies, newline separated.
fn stylesheet_text(doc: &Document) -> String {
    let hrefs = doc
        .select(r#"link[rel="stylesheet"]"#)
        .into_iter()
        .filter_map(|link| link.value().attr("href").map(str::to_string));
    let inline = doc
        .select("style")
        .into_iter()
        .map(|style| style.text().collect::<String>());

    hrefs
        .chain(inline)
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
