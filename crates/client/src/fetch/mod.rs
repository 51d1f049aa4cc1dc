//! HTTP transport used by the worker and the page controller.
//!
//! ### Failure model
//! - A transport error (refused, DNS, timeout, broken body) is
//!   `Error::NetworkUnreachable`, which both callers treat as "offline".
//! - Any HTTP status is a successful response and is passed on as-is.
//!
//! ### Cache-busting
//! - Requests may carry a `CacheMode::Reload` directive.
//! - A transport that cannot honor it strips it in [`Fetcher::prepare`];
//!   [`create_cache_busted_request`] probes for that and falls back to a
//!   `cachebust=<millis>` query parameter.

pub mod request;
pub mod url;

use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use request::{CacheMode, Request, RequestMode, Response};
pub use url::{UrlError, cache_bust, json_variant, resolve};

use pwa_core::Error;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "pwa-offline/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "pwa-offline/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl From<&pwa_core::AppConfig> for FetchConfig {
    fn from(config: &pwa_core::AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// Network seam shared by the worker and the page controller.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Construct the request as this transport will actually send it.
    ///
    /// Transports drop directives they do not support, so callers can probe
    /// the returned request.
    fn prepare(&self, request: Request) -> Request {
        request
    }

    /// Send a request. Errors mean the server could not be reached.
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    fn prepare(&self, request: Request) -> Request {
        (**self).prepare(request)
    }

    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        (**self).fetch(request).await
    }
}

/// Build a request for `url` guaranteed to come fresh from the network.
///
/// Prefers the transport's reload directive. When `fetcher` strips it, the
/// URL gets a `cachebust=<now_millis>` parameter instead.
pub fn create_cache_busted_request(fetcher: &dyn Fetcher, url: &Url, now_millis: i64) -> Request {
    let request = fetcher.prepare(Request::get(url.clone()).with_cache(CacheMode::Reload));
    if request.cache == Some(CacheMode::Reload) {
        return request;
    }

    tracing::debug!(%url, "reload directive not honored; appending cache-busting parameter");
    fetcher.prepare(Request::get(cache_bust(url, now_millis)))
}

/// reqwest-backed transport.
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Create a new transport with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if request.cache == Some(CacheMode::Reload) {
            builder = builder
                .header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))
                .header(header::PRAGMA, HeaderValue::from_static("no-cache"));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::NetworkUnreachable(format!("{}: {}", request.url, e)))?;

        let status = response.status();
        let url = response.url().clone();
        let headers = response.headers().clone();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::NetworkUnreachable(format!("failed to read response: {}", e)))?;

        tracing::debug!(
            "fetched {} -> {} ({}) in {}ms ({} bytes)",
            request.url,
            url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response { url, status, headers, body })
    }
}
