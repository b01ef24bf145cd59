//! In-memory fetchers and observers.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use crate::errors::ExtractionError;
use crate::fetcher::{FetchedPage, ImageProbe, PageFetcher};
use crate::observability::ExtractionObserver;
use crate::result::ExtractionResult;

/// A fetcher that serves canned pages keyed by URL.
///
/// Unknown URLs answer with an HTTP 404 error. Image probes answer
/// [`ImageProbe::Unknown`] unless configured.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Result<FetchedPage, ExtractionError>>,
    probes: HashMap<String, ImageProbe>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Creates an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` at `url`.
    #[must_use]
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        if let Ok(parsed) = Url::parse(url) {
            self.pages
                .insert(parsed.to_string(), Ok(FetchedPage::html(parsed, html)));
        }
        self
    }

    /// Serves `html` at `final_url` when `url` is requested.
    #[must_use]
    pub fn with_redirect(mut self, url: &str, final_url: &str, html: impl Into<String>) -> Self {
        if let (Ok(requested), Ok(target)) = (Url::parse(url), Url::parse(final_url)) {
            let mut page = FetchedPage::html(target, html);
            page.requested_url = requested.clone();
            self.pages.insert(requested.to_string(), Ok(page));
        }
        self
    }

    /// Fails requests for `url` with `error`.
    #[must_use]
    pub fn with_error(mut self, url: &str, error: ExtractionError) -> Self {
        if let Ok(parsed) = Url::parse(url) {
            self.pages.insert(parsed.to_string(), Err(error));
        }
        self
    }

    /// Sets the probe answer for an image URL.
    #[must_use]
    pub fn with_probe(mut self, image_url: &str, probe: ImageProbe) -> Self {
        self.probes.insert(image_url.to_string(), probe);
        self
    }

    /// URLs requested so far, including probes.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, ExtractionError> {
        self.requests.lock().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Err(ExtractionError::http(404, "Not Found")))
    }

    async fn probe_image(&self, url: &str) -> ImageProbe {
        self.requests.lock().push(url.to_string());
        self.probes.get(url).copied().unwrap_or(ImageProbe::Unknown)
    }
}

/// A recorded observer callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    /// Fetch started.
    FetchStart {
        /// Requested URL.
        url: String,
    },
    /// Fetch succeeded.
    FetchComplete {
        /// Requested URL.
        url: String,
        /// HTTP status.
        status_code: u16,
    },
    /// Validation or fetch failed.
    FetchError {
        /// Requested input.
        url: String,
        /// Error code string.
        code: String,
    },
    /// Extraction finished.
    ExtractComplete {
        /// Requested URL.
        url: String,
        /// Result title.
        title: String,
    },
}

/// Observer that records every callback for later assertions.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<ObservedEvent>>,
    request_ids: Mutex<Vec<String>>,
}

impl CollectingObserver {
    /// Creates an empty observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    /// Returns the request ids seen, one per callback.
    pub fn request_ids(&self) -> Vec<String> {
        self.request_ids.lock().clone()
    }

    /// Clears recorded state.
    pub fn clear(&self) {
        self.events.lock().clear();
        self.request_ids.lock().clear();
    }

    fn record(&self, request_id: &str, event: ObservedEvent) {
        self.request_ids.lock().push(request_id.to_string());
        self.events.lock().push(event);
    }
}

impl ExtractionObserver for CollectingObserver {
    fn on_fetch_start(&self, url: &str, request_id: &str) {
        self.record(request_id, ObservedEvent::FetchStart { url: url.to_string() });
    }

    fn on_fetch_complete(&self, url: &str, request_id: &str, _duration_ms: f64, status_code: u16) {
        self.record(
            request_id,
            ObservedEvent::FetchComplete {
                url: url.to_string(),
                status_code,
            },
        );
    }

    fn on_fetch_error(&self, url: &str, request_id: &str, error: &ExtractionError) {
        self.record(
            request_id,
            ObservedEvent::FetchError {
                url: url.to_string(),
                code: error.code().to_string(),
            },
        );
    }

    fn on_extract_complete(
        &self,
        url: &str,
        request_id: &str,
        _duration_ms: f64,
        result: &ExtractionResult,
    ) {
        self.record(
            request_id,
            ObservedEvent::ExtractComplete {
                url: url.to_string(),
                title: result.title.clone(),
            },
        );
    }
}
