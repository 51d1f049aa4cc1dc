//! URL resolution and cache-busting.

use url::Url;

/// Query parameter appended when the transport ignores the reload directive.
pub const CACHE_BUST_PARAM: &str = "cachebust";

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a page or worker URL against the site origin.
///
/// Absolute http(s) URLs pass through, site-relative paths are joined onto
/// `origin`. Fragments are dropped since they never reach the server.
pub fn resolve(origin: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Append a uniqueness parameter so no intermediate cache can answer.
///
/// Joins with `&` when the URL already has a query, `?` otherwise.
pub fn cache_bust(url: &Url, millis: i64) -> Url {
    let mut busted = url.clone();
    let query = match url.query() {
        Some(q) if !q.is_empty() => format!("{q}&{CACHE_BUST_PARAM}={millis}"),
        _ => format!("{CACHE_BUST_PARAM}={millis}"),
    };
    busted.set_query(Some(&query));
    busted
}

/// URL of the JSON rendition of a page.
pub fn json_variant(url: &str) -> String {
    format!("{url}.json")
}
