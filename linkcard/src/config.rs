//! Configuration types for fetching and extraction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::ExtractionError;

/// How hostnames that look local are matched by the network guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalHostPolicy {
    /// Block any hostname containing the text `local`.
    ///
    /// Coarse: this also rejects public names such as `localbakery.com`.
    #[default]
    Substring,
    /// Block only `localhost` and names ending in `.local`, `.localhost`
    /// or `.localdomain`.
    Suffix,
}

/// Configuration for HTTP fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// `Accept` header value.
    #[serde(default = "default_accept")]
    pub accept: String,
    /// `Accept-Language` header value.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Maximum body size in bytes. Longer bodies are truncated.
    #[serde(default = "default_max_size")]
    pub max_response_size: usize,
    /// Additional headers to include.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Disables the private network guard. Only meant for tests against a
    /// local mock server.
    #[serde(default)]
    pub allow_private_networks: bool,
    /// Matching policy for local-looking hostnames.
    #[serde(default)]
    pub local_host_policy: LocalHostPolicy,
    /// Retry scheme-less input such as `example.com/about` as `https://`.
    #[serde(default)]
    pub assume_https: bool,
}

fn default_timeout() -> f64 {
    15.0
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8"
        .to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_max_size() -> usize {
    5 * 1024 * 1024 // 5MB
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            max_response_size: default_max_size(),
            headers: HashMap::new(),
            allow_private_networks: false,
            local_host_policy: LocalHostPolicy::default(),
            assume_https: false,
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the maximum number of redirects.
    #[must_use]
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Allows or blocks private network hosts.
    #[must_use]
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.allow_private_networks = allow;
        self
    }

    /// Sets the local hostname policy.
    #[must_use]
    pub fn with_local_host_policy(mut self, policy: LocalHostPolicy) -> Self {
        self.local_host_policy = policy;
        self
    }

    /// Enables `https://` prefixing for scheme-less input.
    #[must_use]
    pub fn with_assume_https(mut self, assume: bool) -> Self {
        self.assume_https = assume;
        self
    }

    /// Gets timeout as Duration. Fails on negative, NaN or overflowing values.
    pub fn timeout(&self) -> Result<Duration, ExtractionError> {
        seconds_to_duration("timeout_seconds", self.timeout_seconds)
    }
}

/// Length bounds applied to text fields of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLimits {
    /// Maximum title length in characters.
    #[serde(default = "default_max_title")]
    pub max_title_chars: usize,
    /// Maximum description length in characters.
    #[serde(default = "default_max_description")]
    pub max_description_chars: usize,
}

fn default_max_title() -> usize {
    200
}

fn default_max_description() -> usize {
    500
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            max_title_chars: default_max_title(),
            max_description_chars: default_max_description(),
        }
    }
}

/// Configuration for preview image selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Declared width or height (px) above which an image counts as content.
    #[serde(default = "default_min_dimension")]
    pub min_dimension: u32,
    /// Substrings that mark an image URL as site chrome.
    #[serde(default = "default_excluded_patterns")]
    pub excluded_patterns: Vec<String>,
    /// Issue a HEAD request for the chosen image.
    #[serde(default)]
    pub verify: bool,
    /// Timeout for the HEAD request in seconds.
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_seconds: f64,
}

fn default_min_dimension() -> u32 {
    200
}

fn default_excluded_patterns() -> Vec<String> {
    vec![
        "logo".to_string(),
        "icon".to_string(),
        "avatar".to_string(),
        "profile".to_string(),
        "button".to_string(),
        "badge".to_string(),
    ]
}

fn default_verify_timeout() -> f64 {
    5.0
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            min_dimension: default_min_dimension(),
            excluded_patterns: default_excluded_patterns(),
            verify: false,
            verify_timeout_seconds: default_verify_timeout(),
        }
    }
}

impl ImageConfig {
    /// Gets the verification timeout as Duration.
    pub fn verify_timeout(&self) -> Result<Duration, ExtractionError> {
        seconds_to_duration("verify_timeout_seconds", self.verify_timeout_seconds)
    }
}

fn seconds_to_duration(field: &str, seconds: f64) -> Result<Duration, ExtractionError> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|err| ExtractionError::InvalidConfig(format!("{field} = {seconds}: {err}")))
}

/// Configuration for technology detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyConfig {
    /// Number of utility-class-like elements a page must exceed before a
    /// utility CSS framework is reported without a stylesheet reference.
    #[serde(default = "default_utility_threshold")]
    pub utility_class_threshold: usize,
}

fn default_utility_threshold() -> usize {
    5
}

impl Default for TechnologyConfig {
    fn default() -> Self {
        Self {
            utility_class_threshold: default_utility_threshold(),
        }
    }
}

/// Combined configuration for the card extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Text field bounds.
    #[serde(default)]
    pub limits: FieldLimits,
    /// Image selection configuration.
    #[serde(default)]
    pub image: ImageConfig,
    /// Technology detection configuration.
    #[serde(default)]
    pub technology: TechnologyConfig,
}

impl ExtractorConfig {
    /// Creates a new extractor configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the fetch configuration.
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Replaces the field limits.
    #[must_use]
    pub fn with_limits(mut self, limits: FieldLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Enables HEAD verification of the chosen image.
    #[must_use]
    pub fn with_image_verification(mut self, verify: bool) -> Self {
        self.image.verify = verify;
        self
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "linkcard=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_log_filter(),
        }
    }
}
