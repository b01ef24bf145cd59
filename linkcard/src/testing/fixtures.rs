//! HTML fixtures for extraction tests.

/// Builds small HTML documents with metadata tags.
#[derive(Debug, Clone, Default)]
pub struct PageBuilder {
    head: Vec<String>,
    body: Vec<String>,
}

impl PageBuilder {
    /// Creates an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `<title>`.
    #[must_use]
    pub fn title(mut self, text: &str) -> Self {
        self.head.push(format!("<title>{}</title>", escape(text)));
        self
    }

    /// Adds `<meta property=... content=...>`.
    #[must_use]
    pub fn og(mut self, property: &str, content: &str) -> Self {
        self.head.push(format!(
            r#"<meta property="{}" content="{}">"#,
            escape(property),
            escape(content)
        ));
        self
    }

    /// Adds `<meta name=... content=...>`.
    #[must_use]
    pub fn meta(mut self, name: &str, content: &str) -> Self {
        self.head.push(format!(
            r#"<meta name="{}" content="{}">"#,
            escape(name),
            escape(content)
        ));
        self
    }

    /// Adds `<link rel=... href=...>`.
    #[must_use]
    pub fn link(mut self, rel: &str, href: &str) -> Self {
        self.head.push(format!(
            r#"<link rel="{}" href="{}">"#,
            escape(rel),
            escape(href)
        ));
        self
    }

    /// Adds a stylesheet link.
    #[must_use]
    pub fn stylesheet(self, href: &str) -> Self {
        self.link("stylesheet", href)
    }

    /// Adds an `<img>` to the body, with optional dimensions.
    #[must_use]
    pub fn img(mut self, src: &str, width: Option<u32>, height: Option<u32>) -> Self {
        let mut tag = format!(r#"<img src="{}""#, escape(src));
        if let Some(w) = width {
            tag.push_str(&format!(r#" width="{w}""#));
        }
        if let Some(h) = height {
            tag.push_str(&format!(r#" height="{h}""#));
        }
        tag.push('>');
        self.body.push(tag);
        self
    }

    /// Appends raw markup to the body.
    #[must_use]
    pub fn body_html(mut self, html: impl Into<String>) -> Self {
        self.body.push(html.into());
        self
    }

    /// Renders the document.
    #[must_use]
    pub fn build(&self) -> String {
        format!(
            "<!DOCTYPE html><html><head>{}</head><body>{}</body></html>",
            self.head.join(""),
            self.body.join("")
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A page carrying a full set of Open Graph tags.
#[must_use]
pub fn open_graph_page(title: &str, description: &str, image: &str) -> String {
    PageBuilder::new()
        .title("Fallback title")
        .og("og:title", title)
        .og("og:description", description)
        .og("og:image", image)
        .link("icon", "/favicon.png")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_renders_tags() {
        let html = PageBuilder::new()
            .title("A & B")
            .meta("description", "Say \"hi\"")
            .img("/a.png", Some(800), None)
            .build();

        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains(r#"content="Say &quot;hi&quot;""#));
        assert!(html.contains(r#"<img src="/a.png" width="800">"#));
    }

    #[test]
    fn test_open_graph_page() {
        let html = open_graph_page("T", "D", "/cover.jpg");
        assert!(html.contains(r#"property="og:image" content="/cover.jpg""#));
    }
}
