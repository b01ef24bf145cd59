//! Queryable HTML document.

use scraper::{ElementRef, Html, Selector};

use crate::errors::ExtractionError;

/// A parsed HTML page with CSS selector lookups.
///
/// Lookups take selector strings; an unparsable selector matches nothing.
pub struct Document {
    html: Html,
    raw: String,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("raw_len", &self.raw.len())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Parses an HTML body.
    ///
    /// The HTML parser itself is error tolerant; the only rejected input is a
    /// body containing NUL bytes, which means binary content was served
    /// under an HTML content type.
    pub fn parse(body: &str) -> Result<Self, ExtractionError> {
        if body.contains('\0') {
            return Err(ExtractionError::Parse(
                "response body contains binary data".to_string(),
            ));
        }
        Ok(Self {
            html: Html::parse_document(body),
            raw: body.to_string(),
        })
    }

    /// The unparsed source.
    #[must_use]
    pub fn raw_html(&self) -> &str {
        &self.raw
    }

    /// All elements matching `selector`, in document order.
    #[must_use]
    pub fn select(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(_) => {
                tracing::warn!(selector, "Invalid CSS selector");
                Vec::new()
            }
        }
    }

    /// The first element matching `selector`.
    #[must_use]
    pub fn first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let sel = Selector::parse(selector).ok()?;
        self.html.select(&sel).next()
    }

    /// Whether anything matches `selector`.
    #[must_use]
    pub fn exists(&self, selector: &str) -> bool {
        self.first(selector).is_some()
    }

    /// Number of elements matching `selector`.
    #[must_use]
    pub fn count(&self, selector: &str) -> usize {
        Selector::parse(selector).map_or(0, |sel| self.html.select(&sel).count())
    }

    /// Attribute of the first element matching `selector`.
    #[must_use]
    pub fn attr(&self, selector: &str, attr: &str) -> Option<String> {
        self.first(selector)
            .and_then(|el| el.value().attr(attr))
            .map(str::to_string)
    }

    /// `content` of `<meta property="...">`.
    #[must_use]
    pub fn meta_property(&self, property: &str) -> Option<String> {
        self.attr(&format!(r#"meta[property="{property}"]"#), "content")
    }

    /// `content` of `<meta name="...">`.
    #[must_use]
    pub fn meta_name(&self, name: &str) -> Option<String> {
        self.attr(&format!(r#"meta[name="{name}"]"#), "content")
    }

    /// `content` of `<meta itemprop="...">`.
    #[must_use]
    pub fn meta_itemprop(&self, itemprop: &str) -> Option<String> {
        self.attr(&format!(r#"meta[itemprop="{itemprop}"]"#), "content")
    }

    /// `href` of `<link rel="...">`, matching the whole rel value.
    #[must_use]
    pub fn link_href(&self, rel: &str) -> Option<String> {
        self.attr(&format!(r#"link[rel="{rel}"]"#), "href")
    }

    /// Whitespace-collapsed text of the first element matching `selector`.
    #[must_use]
    pub fn first_text(&self, selector: &str) -> Option<String> {
        self.first(selector).map(|el| element_text(&el))
    }
}

/// Text content of an element with whitespace runs collapsed to one space.
#[must_use]
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Trims and collapses every whitespace run to a single space.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <title>  Example
      Domain </title>
    <meta property="og:title" content="OG Title">
    <meta name="description" content="Plain description">
    <meta itemprop="image" content="/schema.png">
    <link rel="shortcut icon" href="/fav.ico">
  </head>
  <body>
    <h1>Heading <em>one</em></h1>
    <p>First</p><p>Second</p>
  </body>
</html>"#;

    #[test]
    fn test_meta_lookups() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(doc.meta_property("og:title").as_deref(), Some("OG Title"));
        assert_eq!(doc.meta_name("description").as_deref(), Some("Plain description"));
        assert_eq!(doc.meta_itemprop("image").as_deref(), Some("/schema.png"));
        assert_eq!(doc.meta_property("og:image"), None);
    }

    #[test]
    fn test_link_href_matches_full_rel() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(doc.link_href("shortcut icon").as_deref(), Some("/fav.ico"));
        assert_eq!(doc.link_href("icon"), None);
    }

    #[test]
    fn test_first_text_collapses_whitespace() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(doc.first_text("title").as_deref(), Some("Example Domain"));
        assert_eq!(doc.first_text("h1").as_deref(), Some("Heading one"));
        assert_eq!(doc.first_text("p").as_deref(), Some("First"));
    }

    #[test]
    fn test_counts_and_invalid_selectors() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(doc.count("p"), 2);
        assert!(doc.exists("h1 em"));
        assert_eq!(doc.count("p[[["), 0);
        assert!(doc.select("p[[[").is_empty());
    }

    #[test]
    fn test_binary_body_rejected() {
        let err = Document::parse("GIF89a\0\0\0").unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::ParseError);
    }

    #[test]
    fn test_fragment_still_parses() {
        let doc = Document::parse("just some text").unwrap();
        assert_eq!(doc.first_text("body").as_deref(), Some("just some text"));
        assert_eq!(doc.raw_html(), "just some text");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace(""), "");
    }
}
