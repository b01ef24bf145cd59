//! Error types for link extraction.
//!
//! Every failure an extraction can hit maps to exactly one [`ExtractionError`]
//! variant. Each variant has a stable machine-readable [`ErrorCode`] and a
//! user-displayable reason string, so callers can show the message directly
//! in a form without inspecting the error further.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Stable identifier for each failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// The input could not be parsed as a URL.
    InvalidUrl,
    /// The URL scheme is not `http` or `https`.
    UnsupportedScheme,
    /// The host points at loopback, a private range, or a local name.
    PrivateNetworkBlocked,
    /// The request did not complete within the configured bound.
    Timeout,
    /// Connection, TLS, DNS or body transfer failure.
    NetworkError,
    /// The server answered with a non-2xx status.
    HttpError,
    /// The response is not an HTML document.
    UnsupportedContentType,
    /// The body could not be loaded as a document.
    ParseError,
    /// The extractor configuration holds an unusable value.
    InvalidConfig,
}

impl ErrorCode {
    /// Returns the kebab-case code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid-url",
            Self::UnsupportedScheme => "unsupported-scheme",
            Self::PrivateNetworkBlocked => "private-network-blocked",
            Self::Timeout => "timeout",
            Self::NetworkError => "network-error",
            Self::HttpError => "http-error",
            Self::UnsupportedContentType => "unsupported-content-type",
            Self::ParseError => "parse-error",
            Self::InvalidConfig => "invalid-config",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error type returned by [`crate::engine::CardExtractor::extract`].
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    /// The input is not a syntactically valid URL.
    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl {
        /// The raw input.
        input: String,
        /// Why parsing failed.
        reason: String,
    },

    /// Only `http` and `https` are fetched.
    #[error("Unsupported URL scheme: {scheme}")]
    UnsupportedScheme {
        /// The rejected scheme.
        scheme: String,
    },

    /// The SSRF guard refused the host.
    #[error("Blocked private network host: {host}")]
    PrivateNetworkBlocked {
        /// The rejected host.
        host: String,
    },

    /// The request exceeded its time bound.
    #[error("Request timed out after {}ms", .after.as_millis())]
    Timeout {
        /// The configured bound.
        after: Duration,
    },

    /// Any other transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response.
    #[error("HTTP error: {status} {status_text}")]
    Http {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase.
        status_text: String,
    },

    /// The response declared a content type other than `text/html`.
    #[error("Unsupported content type: {content_type}")]
    UnsupportedContentType {
        /// The declared content type, empty when the header was missing.
        content_type: String,
    },

    /// The body could not be loaded as a document.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A configuration value cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExtractionError {
    /// Creates an invalid URL error.
    #[must_use]
    pub fn invalid_url(input: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an unsupported scheme error.
    #[must_use]
    pub fn unsupported_scheme(scheme: impl Into<String>) -> Self {
        Self::UnsupportedScheme {
            scheme: scheme.into(),
        }
    }

    /// Creates a private network error.
    #[must_use]
    pub fn private_network(host: impl Into<String>) -> Self {
        Self::PrivateNetworkBlocked { host: host.into() }
    }

    /// Creates an HTTP status error.
    #[must_use]
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
        }
    }

    /// Creates an unsupported content type error.
    #[must_use]
    pub fn unsupported_content_type(content_type: impl Into<String>) -> Self {
        Self::UnsupportedContentType {
            content_type: content_type.into(),
        }
    }

    /// Classifies a transport error from the HTTP client.
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout { after: timeout };
        }
        if let Some(status) = err.status() {
            return Self::http(status.as_u16(), status.canonical_reason().unwrap_or(""));
        }
        Self::Network(err.to_string())
    }

    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidUrl { .. } => ErrorCode::InvalidUrl,
            Self::UnsupportedScheme { .. } => ErrorCode::UnsupportedScheme,
            Self::PrivateNetworkBlocked { .. } => ErrorCode::PrivateNetworkBlocked,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Network(_) => ErrorCode::NetworkError,
            Self::Http { .. } => ErrorCode::HttpError,
            Self::UnsupportedContentType { .. } => ErrorCode::UnsupportedContentType,
            Self::Parse(_) => ErrorCode::ParseError,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
        }
    }

    /// Returns the HTTP status for `http-error`, `None` otherwise.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns a reason string suitable for showing to an end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl { .. } => "Invalid URL format".to_string(),
            Self::UnsupportedScheme { .. } => "Only HTTP/HTTPS URLs are allowed".to_string(),
            Self::PrivateNetworkBlocked { .. } => "Private URLs are not allowed".to_string(),
            Self::Timeout { .. } => {
                "Request timeout - website took too long to respond".to_string()
            }
            Self::Network(_) => {
                "Failed to fetch website. The site might be down or blocking access.".to_string()
            }
            Self::Http {
                status,
                status_text,
            } => format!("Website returned {status}: {status_text}"),
            Self::UnsupportedContentType { .. } => "URL does not point to an HTML page".to_string(),
            Self::Parse(_) => {
                "Failed to scrape website. Please check the URL and try again.".to_string()
            }
            Self::InvalidConfig(_) => "Link extraction is misconfigured".to_string(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code()));
        map.insert("message".to_string(), serde_json::json!(self.user_message()));
        map.insert("detail".to_string(), serde_json::json!(self.to_string()));
        if let Some(status) = self.status() {
            map.insert("status".to_string(), serde_json::json!(status));
        }
        map
    }
}
