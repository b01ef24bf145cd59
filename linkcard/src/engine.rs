//! The extraction entry point.
//!
//! [`CardExtractor::extract`] validates the input, fetches the page once,
//! runs every field extractor over the parsed document and assembles the
//! bounded result.

use std::sync::Arc;

use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::config::ExtractorConfig;
use crate::document::Document;
use crate::errors::ExtractionError;
use crate::extractors::{extract_description, extract_favicon, extract_image, extract_title};
use crate::fetcher::{HttpFetcher, ImageProbe, NetworkGuard, PageFetcher};
use crate::observability::{ExtractionObserver, NoOpObserver, SpanTimer};
use crate::result::{assemble, ExtractedFields, ExtractionResult};
use crate::technology::TechnologyDetector;

/// Turns a URL into an [`ExtractionResult`].
#[derive(Clone)]
pub struct CardExtractor {
    fetcher: Arc<dyn PageFetcher>,
    config: ExtractorConfig,
    observer: Arc<dyn ExtractionObserver>,
    guard: NetworkGuard,
}

impl std::fmt::Debug for CardExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardExtractor")
            .field("config", &self.config)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

impl CardExtractor {
    /// Creates an extractor backed by [`HttpFetcher`].
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractionError> {
        let fetcher = HttpFetcher::new(config.fetch.clone())?
            .with_probe_timeout(config.image.verify_timeout()?);
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Creates an extractor with a custom fetcher.
    #[must_use]
    pub fn with_fetcher(config: ExtractorConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let guard = NetworkGuard::from_config(&config.fetch);
        Self {
            fetcher,
            config,
            observer: Arc::new(NoOpObserver),
            guard,
        }
    }

    /// Sets the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts card metadata from the page at `url`.
    ///
    /// Invalid, non-HTTP and private-network inputs fail before any request
    /// is made.
    pub async fn extract(&self, url: &str) -> Result<ExtractionResult, ExtractionError> {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("extract", request_id = %request_id, url = %url);
        self.run(url, &request_id).instrument(span).await
    }

    /// Extracts card metadata from an already fetched body served at
    /// `page_url`. No network access.
    pub fn extract_from_html(
        &self,
        html: &str,
        page_url: &str,
    ) -> Result<ExtractionResult, ExtractionError> {
        let base = Url::parse(page_url).map_err(|e| ExtractionError::invalid_url(page_url, e))?;
        let fields = self.extract_fields(html, &base)?;
        Ok(assemble(fields, base.as_str(), self.config.limits))
    }

    async fn run(&self, input: &str, request_id: &str) -> Result<ExtractionResult, ExtractionError> {
        let timer = SpanTimer::start("extract");

        let target = self.guard.validate(input).map_err(|err| {
            self.observer.on_fetch_error(input, request_id, &err);
            err
        })?;
        let source_url = target.to_string();

        self.observer.on_fetch_start(&source_url, request_id);
        let page = self.fetcher.fetch(&target).await.map_err(|err| {
            self.observer.on_fetch_error(&source_url, request_id, &err);
            err
        })?;
        self.observer
            .on_fetch_complete(&source_url, request_id, page.duration_ms, page.status_code);

        if page.was_redirected() {
            tracing::debug!(final_url = %page.final_url, "Resolving against redirect target");
        }
        if page.truncated {
            tracing::debug!(bytes = page.body.len(), "Extracting from truncated body");
        }

        let mut fields = self.extract_fields(&page.body, &page.final_url).map_err(|err| {
            self.observer.on_fetch_error(&source_url, request_id, &err);
            err
        })?;

        if self.config.image.verify {
            if let Some(image) = fields.image_url.as_deref() {
                if self.fetcher.probe_image(image).await == ImageProbe::Missing {
                    tracing::debug!(image, "Dropping unreachable image");
                    fields.image_url = None;
                }
            }
        }

        let result = assemble(fields, &source_url, self.config.limits);
        let duration_ms = timer.finish();
        self.observer
            .on_extract_complete(&source_url, request_id, duration_ms, &result);

        Ok(result)
    }

    /// Runs the field extractors. The parsed document never outlives this
    /// call.
    fn extract_fields(&self, body: &str, base: &Url) -> Result<ExtractedFields, ExtractionError> {
        let doc = Document::parse(body)?;

        Ok(ExtractedFields {
            title: extract_title(&doc),
            description: extract_description(&doc),
            image_url: extract_image(&doc, base, &self.config.image),
            favicon: extract_favicon(&doc, base),
            technologies: TechnologyDetector::new(self.config.technology).detect(&doc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetchConfig, FieldLimits};
    use crate::errors::ErrorCode;
    use crate::fetcher::{FetchedPage, MockPageFetcher};
    use crate::testing::{open_graph_page, CollectingObserver, ObservedEvent, PageBuilder, StaticFetcher};
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    fn offline(fetcher: StaticFetcher) -> CardExtractor {
        CardExtractor::with_fetcher(ExtractorConfig::default(), Arc::new(fetcher))
    }

    fn local_config() -> ExtractorConfig {
        ExtractorConfig::default().with_fetch(FetchConfig::default().allow_private_networks(true))
    }

    #[tokio::test]
    async fn test_open_graph_card() {
        let html = open_graph_page("Launch", "A new thing", "/img/cover.jpg");
        let extractor = offline(StaticFetcher::new().with_page("https://site.test/post", html));

        let result = extractor.extract("https://site.test/post").await.unwrap();

        assert_eq!(result.title, "Launch");
        assert_eq!(result.description, "A new thing");
        assert_eq!(result.image_url.as_deref(), Some("https://site.test/img/cover.jpg"));
        assert_eq!(result.favicon.as_deref(), Some("https://site.test/favicon.png"));
        assert_eq!(result.source_url, "https://site.test/post");
    }

    #[tokio::test]
    async fn test_title_precedence() {
        let html = PageBuilder::new()
            .title("Doc Title")
            .og("og:site_name", "Site Name")
            .body_html("<h1>Heading</h1>")
            .build();
        let extractor = offline(StaticFetcher::new().with_page("https://site.test/", html));

        let result = extractor.extract("https://site.test/").await.unwrap();
        assert_eq!(result.title, "Site Name");
    }

    #[tokio::test]
    async fn test_long_description_truncated() {
        let html = PageBuilder::new().meta("description", &"x".repeat(1000)).build();
        let extractor = offline(StaticFetcher::new().with_page("https://site.test/", html));

        let result = extractor.extract("https://site.test/").await.unwrap();
        assert_eq!(result.description.chars().count(), 500);
    }

    #[tokio::test]
    async fn test_empty_page_defaults() {
        let extractor = offline(StaticFetcher::new().with_page("https://site.test/a/b", "<html></html>"));

        let result = extractor.extract("https://site.test/a/b").await.unwrap();
        assert_eq!(result.title, "");
        assert_eq!(result.description, "");
        assert_eq!(result.image_url, None);
        assert_eq!(result.favicon.as_deref(), Some("https://site.test/favicon.ico"));
        assert!(result.technologies.is_empty());
    }

    #[tokio::test]
    async fn test_relative_urls_use_final_url() {
        let html = PageBuilder::new().og("og:image", "cover.png").build();
        let extractor = offline(StaticFetcher::new().with_redirect(
            "http://site.test/",
            "https://www.site.test/blog/",
            html,
        ));

        let result = extractor.extract("http://site.test/").await.unwrap();
        assert_eq!(result.image_url.as_deref(), Some("https://www.site.test/blog/cover.png"));
        assert_eq!(result.source_url, "http://site.test/");
    }

    #[tokio::test]
    async fn test_blocked_hosts_never_fetch() {
        let mut mock = MockPageFetcher::new();
        mock.expect_fetch().never();
        let extractor = CardExtractor::with_fetcher(ExtractorConfig::default(), Arc::new(mock));

        for url in [
            "http://127.0.0.1/",
            "http://10.0.0.5/admin",
            "http://192.168.1.1/",
            "http://172.20.3.4/",
            "http://localhost:8080/",
            "http://printer.local/",
        ] {
            let err = extractor.extract(url).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::PrivateNetworkBlocked, "{url}");
        }
    }

    #[tokio::test]
    async fn test_invalid_inputs() {
        let mut mock = MockPageFetcher::new();
        mock.expect_fetch().never();
        let extractor = CardExtractor::with_fetcher(ExtractorConfig::default(), Arc::new(mock));

        let err = extractor.extract("not a url").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidUrl);

        let err = extractor.extract("ftp://example.com/file").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedScheme);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let mut mock = MockPageFetcher::new();
        mock.expect_fetch()
            .times(1)
            .returning(|_| Err(ExtractionError::http(503, "Service Unavailable")));
        let extractor = CardExtractor::with_fetcher(ExtractorConfig::default(), Arc::new(mock));

        let err = extractor.extract("https://example.com/").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.user_message(), "Website returned 503: Service Unavailable");
    }

    #[tokio::test]
    async fn test_binary_body_is_parse_error() {
        let mut mock = MockPageFetcher::new();
        mock.expect_fetch().returning(|url| {
            Ok(FetchedPage::html(url.clone(), "\u{0}\u{1}PNG\u{0}"))
        });
        let extractor = CardExtractor::with_fetcher(ExtractorConfig::default(), Arc::new(mock));

        let err = extractor.extract("https://example.com/").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseError);
    }

    #[tokio::test]
    async fn test_image_verification() {
        let html = open_graph_page("T", "D", "https://cdn.site.test/gone.jpg");
        let config = ExtractorConfig::default().with_image_verification(true);

        let missing = StaticFetcher::new()
            .with_page("https://site.test/", html.clone())
            .with_probe("https://cdn.site.test/gone.jpg", ImageProbe::Missing);
        let extractor = CardExtractor::with_fetcher(config.clone(), Arc::new(missing));
        let result = extractor.extract("https://site.test/").await.unwrap();
        assert_eq!(result.image_url, None);

        let unknown = StaticFetcher::new().with_page("https://site.test/", html);
        let extractor = CardExtractor::with_fetcher(config, Arc::new(unknown));
        let result = extractor.extract("https://site.test/").await.unwrap();
        assert_eq!(result.image_url.as_deref(), Some("https://cdn.site.test/gone.jpg"));
    }

    #[tokio::test]
    async fn test_observer_sees_lifecycle() {
        let observer = Arc::new(CollectingObserver::new());
        let extractor = offline(StaticFetcher::new().with_page("https://site.test/", "<title>Hi</title>"))
            .with_observer(observer.clone());

        extractor.extract("https://site.test/").await.unwrap();
        extractor.extract("http://localhost/").await.unwrap_err();

        let events = observer.events();
        assert_eq!(
            events,
            vec![
                ObservedEvent::FetchStart { url: "https://site.test/".into() },
                ObservedEvent::FetchComplete { url: "https://site.test/".into(), status_code: 200 },
                ObservedEvent::ExtractComplete { url: "https://site.test/".into(), title: "Hi".into() },
                ObservedEvent::FetchError {
                    url: "http://localhost/".into(),
                    code: "private-network-blocked".into()
                },
            ]
        );

        let ids = observer.request_ids();
        assert_eq!(ids[0], ids[2]);
        assert_ne!(ids[0], ids[3]);
    }

    #[test]
    fn test_extract_from_html() {
        let extractor = offline(StaticFetcher::new());
        let html = PageBuilder::new()
            .meta("generator", "WordPress 6.5")
            .og("og:title", "Post")
            .build();

        let result = extractor
            .extract_from_html(&html, "https://blog.test/2024/post")
            .unwrap();
        assert_eq!(result.title, "Post");
        assert_eq!(result.technologies, vec!["WordPress"]);

        let err = extractor.extract_from_html(&html, "relative/path").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidUrl);
    }

    #[tokio::test]
    async fn test_end_to_end_over_http() {
        let server = MockServer::start();
        let utility = (0..8)
            .map(|i| format!(r#"<div class="flex px-{i}">x</div>"#))
            .collect::<String>();
        let html = PageBuilder::new()
            .meta("generator", "WordPress 6.5")
            .stylesheet("/wp-content/themes/x/tailwind.css")
            .og("og:title", "Hello")
            .og("og:image", "/cover.jpg")
            .body_html(utility)
            .build();
        let page = server.mock(|when, then| {
            when.method(GET).path("/article");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(html);
        });

        let extractor = CardExtractor::new(local_config()).unwrap();
        let result = extractor.extract(&server.url("/article")).await.unwrap();

        page.assert();
        assert_eq!(result.title, "Hello");
        assert_eq!(result.image_url, Some(server.url("/cover.jpg")));
        assert_eq!(result.technologies, vec!["WordPress", "Tailwind CSS"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_reported_to_observer() {
        let observer = Arc::new(CollectingObserver::new());
        let timeout = ExtractionError::Timeout {
            after: std::time::Duration::from_secs(15),
        };
        let extractor = offline(StaticFetcher::new().with_error("https://slow.test/", timeout))
            .with_observer(observer.clone());

        let err = extractor.extract("https://slow.test/").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Timeout);
        assert_eq!(
            observer.events().last(),
            Some(&ObservedEvent::FetchError {
                url: "https://slow.test/".into(),
                code: "timeout".into()
            })
        );
    }

    #[tokio::test]
    async fn test_custom_field_limits() {
        let html = PageBuilder::new()
            .og("og:title", "A rather long title")
            .meta("description", "Short description")
            .build();
        let config = ExtractorConfig::new().with_limits(FieldLimits {
            max_title_chars: 8,
            max_description_chars: 5,
        });
        let fetcher = StaticFetcher::new().with_page("https://site.test/", html);
        let extractor = CardExtractor::with_fetcher(config, Arc::new(fetcher));

        let result = extractor.extract("https://site.test/").await.unwrap();
        assert_eq!(result.title, "A rather");
        assert_eq!(result.description, "Short");
    }

    #[test]
    fn test_unusable_timeouts_fail_construction() {
        let config = ExtractorConfig::default()
            .with_fetch(FetchConfig::default().with_timeout(-1.0));
        let err = CardExtractor::new(config).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidConfig);

        let mut config = ExtractorConfig::default();
        config.image.verify_timeout_seconds = f64::NAN;
        let err = CardExtractor::new(config).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidConfig);
    }

    #[tokio::test]
    async fn test_timeout_over_http() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .header("content-type", "text/html")
                .body("<title>late</title>")
                .delay(std::time::Duration::from_millis(1500));
        });

        let config = local_config().with_fetch(
            FetchConfig::default()
                .allow_private_networks(true)
                .with_timeout(0.2),
        );
        let extractor = CardExtractor::new(config).unwrap();

        let err = extractor.extract(&server.url("/slow")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Timeout);
    }
}
