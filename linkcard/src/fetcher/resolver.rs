//! DNS resolution that refuses private addresses.

use std::net::SocketAddr;

use reqwest::dns::{Addrs, Name, Resolve, Resolving};

use super::guard::is_blocked_ip;
use crate::errors::ExtractionError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// System resolver that fails when a name maps to loopback, private or
/// link-local space.
///
/// Installed on the HTTP client, so it covers the first request, every
/// redirect hop and image probes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardedResolver;

impl Resolve for GuardedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(lookup(name.as_str().to_string()))
    }
}

async fn lookup(host: String) -> Result<Addrs, BoxError> {
    let resolved = tokio::net::lookup_host((host.as_str(), 0)).await?;
    let addrs = reject_private(&host, resolved)?;
    Ok(Box::new(addrs.into_iter()))
}

/// Passes `addrs` through unless any of them is blocked.
pub(crate) fn reject_private(
    host: &str,
    addrs: impl IntoIterator<Item = SocketAddr>,
) -> Result<Vec<SocketAddr>, ExtractionError> {
    let addrs: Vec<SocketAddr> = addrs.into_iter().collect();
    if let Some(blocked) = addrs.iter().find(|addr| is_blocked_ip(addr.ip())) {
        tracing::warn!(host, ip = %blocked.ip(), "Host resolves to a private address");
        return Err(ExtractionError::private_network(host));
    }
    if addrs.is_empty() {
        return Err(ExtractionError::Network(format!("no addresses found for {host}")));
    }
    Ok(addrs)
}
