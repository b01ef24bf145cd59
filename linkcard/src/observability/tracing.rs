//! Extraction lifecycle callbacks and timing.

use std::time::Instant;

use crate::errors::ExtractionError;
use crate::result::ExtractionResult;

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

/// Observability callbacks for one extraction.
pub trait ExtractionObserver: Send + Sync {
    /// Called before the page request is sent.
    fn on_fetch_start(&self, url: &str, request_id: &str);

    /// Called when the page was fetched.
    fn on_fetch_complete(&self, url: &str, request_id: &str, duration_ms: f64, status_code: u16);

    /// Called when validation or fetching failed.
    fn on_fetch_error(&self, url: &str, request_id: &str, error: &ExtractionError);

    /// Called with the final result.
    fn on_extract_complete(
        &self,
        url: &str,
        request_id: &str,
        duration_ms: f64,
        result: &ExtractionResult,
    );
}

/// No-op implementation of [`ExtractionObserver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl ExtractionObserver for NoOpObserver {
    fn on_fetch_start(&self, _url: &str, _request_id: &str) {}
    fn on_fetch_complete(&self, _url: &str, _request_id: &str, _duration_ms: f64, _status_code: u16) {}
    fn on_fetch_error(&self, _url: &str, _request_id: &str, _error: &ExtractionError) {}
    fn on_extract_complete(&self, _url: &str, _request_id: &str, _duration_ms: f64, _result: &ExtractionResult) {}
}

/// Observer that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl ExtractionObserver for LoggingObserver {
    fn on_fetch_start(&self, url: &str, request_id: &str) {
        tracing::debug!(url, request_id, "Fetch started");
    }

    fn on_fetch_complete(&self, url: &str, request_id: &str, duration_ms: f64, status_code: u16) {
        tracing::info!(url, request_id, duration_ms, status_code, "Fetch completed");
    }

    fn on_fetch_error(&self, url: &str, request_id: &str, error: &ExtractionError) {
        tracing::warn!(
            url,
            request_id,
            code = %error.code(),
            error = %error,
            "Fetch failed"
        );
    }

    fn on_extract_complete(
        &self,
        url: &str,
        request_id: &str,
        duration_ms: f64,
        result: &ExtractionResult,
    ) {
        tracing::info!(
            url,
            request_id,
            duration_ms,
            has_image = result.image_url.is_some(),
            technologies = result.technologies.len(),
            "Extraction completed"
        );
    }
}
