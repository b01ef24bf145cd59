//! Bounded single-attempt page retrieval.
//!
//! [`HttpFetcher`] issues exactly one GET per call, follows redirects that
//! pass the [`NetworkGuard`], and rejects anything that is not a 2xx
//! `text/html` response. There is no retry.

mod guard;
mod resolver;

pub use guard::NetworkGuard;
pub use resolver::GuardedResolver;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::FetchConfig;
use crate::errors::ExtractionError;

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested.
    pub requested_url: Url,
    /// Final URL after redirects.
    pub final_url: Url,
    /// HTTP status code.
    pub status_code: u16,
    /// Declared content type.
    pub content_type: String,
    /// Response body, possibly truncated to the configured maximum.
    pub body: String,
    /// Whether the body was cut at the size limit.
    pub truncated: bool,
    /// Time taken to fetch in milliseconds.
    pub duration_ms: f64,
}

impl FetchedPage {
    /// Creates a page for an HTML body served at `url`, without redirects.
    #[must_use]
    pub fn html(url: Url, body: impl Into<String>) -> Self {
        Self {
            requested_url: url.clone(),
            final_url: url,
            status_code: 200,
            content_type: "text/html; charset=utf-8".to_string(),
            body: body.into(),
            truncated: false,
            duration_ms: 0.0,
        }
    }

    /// Whether the page was reached through at least one redirect.
    #[must_use]
    pub fn was_redirected(&self) -> bool {
        self.requested_url != self.final_url
    }
}

/// Outcome of a best-effort image availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProbe {
    /// The server answered 2xx.
    Available,
    /// The server answered 404 or 410.
    Missing,
    /// Anything else, including timeouts and blocked hosts.
    Unknown,
}

/// Protocol for page fetching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches an HTML page. The URL has already passed the network guard.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, ExtractionError>;

    /// Checks whether an image URL is reachable. Never fails.
    async fn probe_image(&self, url: &str) -> ImageProbe;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
    guard: NetworkGuard,
    timeout: Duration,
    probe_timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher. The underlying client is built once and reused.
    pub fn new(config: FetchConfig) -> Result<Self, ExtractionError> {
        let guard = NetworkGuard::from_config(&config);
        let max_redirects = config.max_redirects;

        let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                return attempt.error(ExtractionError::Network(format!(
                    "too many redirects (limit {max_redirects})"
                )));
            }
            match guard.check(attempt.url()) {
                Ok(()) => attempt.follow(),
                Err(err) => attempt.error(err),
            }
        });

        let timeout = config.timeout()?;
        let mut builder = reqwest::Client::builder()
            .redirect(redirect_policy)
            .user_agent(&config.user_agent)
            .default_headers(build_headers(&config))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true);
        if !config.allow_private_networks {
            builder = builder.dns_resolver(Arc::new(GuardedResolver));
        }
        let client = builder
            .build()
            .map_err(|err| ExtractionError::Network(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            config,
            guard,
            timeout,
            probe_timeout: Duration::from_secs(5),
        })
    }

    /// Sets the timeout used by [`PageFetcher::probe_image`].
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    fn classify(&self, err: &reqwest::Error) -> ExtractionError {
        // Errors raised by the redirect policy travel inside the reqwest error.
        let mut source = err.source();
        while let Some(inner) = source {
            if let Some(ours) = inner.downcast_ref::<ExtractionError>() {
                return ours.clone();
            }
            source = inner.source();
        }
        ExtractionError::from_reqwest(err, self.timeout)
    }

    async fn read_body(
        &self,
        mut response: reqwest::Response,
    ) -> Result<(String, bool), ExtractionError> {
        let limit = self.config.max_response_size;
        let mut buf: Vec<u8> = Vec::new();
        let mut truncated = false;

        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(&e))? {
            let remaining = limit.saturating_sub(buf.len());
            if chunk.len() > remaining {
                buf.extend_from_slice(&chunk[..remaining]);
                truncated = true;
                break;
            }
            buf.extend_from_slice(&chunk);
        }

        Ok((String::from_utf8_lossy(&buf).into_owned(), truncated))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, ExtractionError> {
        self.guard.check(url)?;
        let start = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
            ));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.to_ascii_lowercase().contains("text/html") {
            return Err(ExtractionError::unsupported_content_type(content_type));
        }

        let final_url = response.url().clone();
        let (body, truncated) = self.read_body(response).await?;
        if truncated {
            tracing::debug!(url = %url, limit = self.config.max_response_size, "Response body truncated");
        }

        Ok(FetchedPage {
            requested_url: url.clone(),
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
            truncated,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    async fn probe_image(&self, url: &str) -> ImageProbe {
        let Ok(parsed) = Url::parse(url) else {
            return ImageProbe::Unknown;
        };
        if self.guard.check(&parsed).is_err() {
            return ImageProbe::Unknown;
        }

        match self
            .client
            .head(parsed)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => ImageProbe::Available,
            Ok(response) if matches!(response.status().as_u16(), 404 | 410) => ImageProbe::Missing,
            Ok(_) => ImageProbe::Unknown,
            Err(err) => {
                tracing::debug!(url, error = %err, "Image probe failed");
                ImageProbe::Unknown
            }
        }
    }
}

fn build_headers(config: &FetchConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let fixed = [
        (header::ACCEPT, config.accept.as_str()),
        (header::ACCEPT_LANGUAGE, config.accept_language.as_str()),
        (header::CACHE_CONTROL, "no-cache"),
        (header::PRAGMA, "no-cache"),
    ];
    for (name, value) in fixed {
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    }
    insert_extra_headers(&mut headers, &config.headers);
    headers
}

fn insert_extra_headers(headers: &mut HeaderMap, extra: &HashMap<String, String>) {
    for (key, value) in extra {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %key, "Skipping invalid header"),
        }
    }
}
