//! Pre-flight URL validation and the private network (SSRF) guard.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

use crate::config::{FetchConfig, LocalHostPolicy};
use crate::errors::ExtractionError;

const LOCAL_SUFFIXES: [&str; 3] = [".local", ".localhost", ".localdomain"];

/// Validates URLs before any network access.
///
/// Host names are judged by their text only. Addresses they resolve to are
/// checked by the fetcher's resolver before a connection is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkGuard {
    allow_private: bool,
    policy: LocalHostPolicy,
    assume_https: bool,
}

impl Default for NetworkGuard {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

impl NetworkGuard {
    /// Creates a guard from the fetch configuration.
    #[must_use]
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            allow_private: config.allow_private_networks,
            policy: config.local_host_policy,
            assume_https: config.assume_https,
        }
    }

    /// Parses `input` and checks scheme and host.
    pub fn validate(&self, input: &str) -> Result<Url, ExtractionError> {
        let url = self.parse(input)?;
        self.check(&url)?;
        Ok(url)
    }

    /// Checks scheme and host of an already parsed URL.
    pub fn check(&self, url: &Url) -> Result<(), ExtractionError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ExtractionError::unsupported_scheme(url.scheme()));
        }
        if self.allow_private {
            return Ok(());
        }

        let Some(host) = url.host() else {
            return Err(ExtractionError::invalid_url(url.as_str(), "missing host"));
        };
        if self.is_blocked_host(&host) {
            return Err(ExtractionError::private_network(host.to_string()));
        }
        Ok(())
    }

    fn parse(&self, input: &str) -> Result<Url, ExtractionError> {
        let input = input.trim();
        match Url::parse(input) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) if self.assume_https => {
                Url::parse(&format!("https://{input}"))
                    .map_err(|err| ExtractionError::invalid_url(input, err))
            }
            Err(err) => Err(ExtractionError::invalid_url(input, err)),
        }
    }

    fn is_blocked_host(&self, host: &Host<&str>) -> bool {
        match host {
            Host::Ipv4(ip) => is_blocked_ipv4(*ip),
            Host::Ipv6(ip) => is_blocked_ipv6(*ip),
            Host::Domain(domain) => self.is_local_name(domain),
        }
    }

    fn is_local_name(&self, domain: &str) -> bool {
        let domain = domain.trim_end_matches('.').to_ascii_lowercase();
        if domain == "localhost" {
            return true;
        }
        match self.policy {
            LocalHostPolicy::Substring => domain.contains("local"),
            LocalHostPolicy::Suffix => LOCAL_SUFFIXES.iter().any(|s| domain.ends_with(s)),
        }
    }
}

/// Whether an address must never be contacted.
pub(crate) fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_blocked_ipv4(v4),
        IpAddr::V6(v6) => is_blocked_ipv6(v6),
    }
}

/// Loopback, RFC1918, link-local and the unspecified address.
fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(mapped);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local fc00::/7
        || (first & 0xffc0) == 0xfe80 // link local fe80::/10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn code_for(guard: &NetworkGuard, input: &str) -> Option<ErrorCode> {
        guard.validate(input).err().map(|e| e.code())
    }

    #[test]
    fn test_public_urls_pass() {
        let guard = NetworkGuard::default();
        assert!(guard.validate("https://example.com/posts/1").is_ok());
        assert!(guard.validate("http://93.184.216.34/").is_ok());
        assert!(guard.validate("https://172.32.0.1/").is_ok());
    }

    #[test]
    fn test_invalid_input() {
        let guard = NetworkGuard::default();
        assert_eq!(code_for(&guard, "not a url"), Some(ErrorCode::InvalidUrl));
        assert_eq!(code_for(&guard, "/relative/path"), Some(ErrorCode::InvalidUrl));
        assert_eq!(code_for(&guard, ""), Some(ErrorCode::InvalidUrl));
    }

    #[test]
    fn test_unsupported_scheme() {
        let guard = NetworkGuard::default();
        assert_eq!(code_for(&guard, "ftp://example.com/file"), Some(ErrorCode::UnsupportedScheme));
        assert_eq!(code_for(&guard, "file:///etc/passwd"), Some(ErrorCode::UnsupportedScheme));
        assert_eq!(code_for(&guard, "javascript:alert(1)"), Some(ErrorCode::UnsupportedScheme));
    }

    #[test]
    fn test_private_hosts_blocked() {
        let guard = NetworkGuard::default();
        for input in [
            "http://localhost:3000/",
            "http://LOCALHOST./",
            "http://127.0.0.1/",
            "http://127.8.9.10/",
            "http://10.0.0.5/admin",
            "http://172.16.0.1/",
            "http://172.31.255.255/",
            "http://192.168.1.1/",
            "http://169.254.169.254/latest/meta-data",
            "http://0.0.0.0/",
            "http://[::1]/",
            "http://[fd00::1]/",
            "http://[::ffff:10.0.0.1]/",
            "http://printer.local/",
        ] {
            assert_eq!(
                code_for(&guard, input),
                Some(ErrorCode::PrivateNetworkBlocked),
                "{input} should be blocked"
            );
        }
    }

    #[test]
    fn test_substring_policy_is_coarse() {
        let guard = NetworkGuard::default();
        assert_eq!(
            code_for(&guard, "https://localbakery.com/"),
            Some(ErrorCode::PrivateNetworkBlocked)
        );
    }

    #[test]
    fn test_suffix_policy() {
        let config = FetchConfig::new().with_local_host_policy(LocalHostPolicy::Suffix);
        let guard = NetworkGuard::from_config(&config);
        assert!(guard.validate("https://localbakery.com/").is_ok());
        assert_eq!(code_for(&guard, "http://nas.local/"), Some(ErrorCode::PrivateNetworkBlocked));
        assert_eq!(code_for(&guard, "http://localhost/"), Some(ErrorCode::PrivateNetworkBlocked));
    }

    #[test]
    fn test_allow_private_networks_still_checks_scheme() {
        let guard = NetworkGuard::from_config(&FetchConfig::new().allow_private_networks(true));
        assert!(guard.validate("http://127.0.0.1:8080/").is_ok());
        assert_eq!(code_for(&guard, "ftp://127.0.0.1/"), Some(ErrorCode::UnsupportedScheme));
    }

    #[test]
    fn test_assume_https() {
        let guard = NetworkGuard::from_config(&FetchConfig::new().with_assume_https(true));
        let url = guard.validate("  example.com/about ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/about");

        let strict = NetworkGuard::default();
        assert_eq!(code_for(&strict, "example.com/about"), Some(ErrorCode::InvalidUrl));
    }
}
