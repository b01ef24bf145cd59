//! Relative-to-absolute URL normalization.
//!
//! [`resolve`] never fails: an empty string means "no usable value".

use url::Url;

/// Resolves `candidate` against `base`.
///
/// - empty or whitespace-only input resolves to an empty string
/// - `data:` and `blob:` URIs are returned verbatim
/// - protocol-relative `//host/path` takes the scheme of `base`
/// - `http://` and `https://` URLs are returned verbatim
/// - everything else is joined with standard URL semantics, falling back to
///   [`join_manually`] when the join is rejected
#[must_use]
pub fn resolve(base: &Url, candidate: &str) -> String {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return String::new();
    }

    if candidate.starts_with("data:") || candidate.starts_with("blob:") {
        return candidate.to_string();
    }

    if candidate.starts_with("//") {
        return format!("{}:{}", base.scheme(), candidate);
    }

    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return candidate.to_string();
    }

    match base.join(candidate) {
        Ok(joined) => joined.to_string(),
        Err(err) => {
            tracing::debug!(base = %base, candidate, error = %err, "URL join failed, joining manually");
            join_manually(base, candidate).unwrap_or_default()
        }
    }
}

/// Best-effort path join used when [`Url::join`] rejects the candidate.
///
/// An absolute path is appended to the origin of `base`; anything else is
/// appended to the directory part of the base path (up to the last `/`).
/// The output is not validated and may not be a well-formed URL. Returns
/// `None` when `base` has no host.
#[must_use]
pub fn join_manually(base: &Url, candidate: &str) -> Option<String> {
    let host = base.host_str()?;
    let authority = match base.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let origin = format!("{}://{}", base.scheme(), authority);

    if candidate.starts_with('/') {
        return Some(format!("{origin}{candidate}"));
    }

    let path = base.path();
    let directory = path.rfind('/').map_or("/", |i| &path[..=i]);
    Some(format!("{origin}{directory}{candidate}"))
}
