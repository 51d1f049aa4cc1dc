//! Offline cache manager.
//!
//! Runs as the installable background worker: installs the offline fallback
//! document into the versioned store, then answers navigation requests
//! cache-first, falling back to the network and finally to the offline
//! document.
//!
//! Every successfully fetched navigation response is kept. The store has no
//! eviction, size cap or TTL.

use pwa_core::{AppConfig, CacheDb, CachedResponse, Error};
use reqwest::{Method, Url};

use crate::fetch::{Fetcher, Request, RequestMode, create_cache_busted_request, resolve};

/// Immutable worker settings, derived from [`AppConfig`] at startup.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Active store, `offline-v<N>`.
    pub cache_name: String,
    /// Logical key of the offline document.
    pub offline_url: Url,
    /// Scope the worker is registered under.
    pub scope: String,
    /// URL of the worker script named in the registration.
    pub script_url: Url,
}

impl WorkerConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let offline_url = resolve(&origin, &config.offline_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let script_url = resolve(&origin, &config.worker_script).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { cache_name: config.offline_cache_name(), offline_url, scope: config.scope.clone(), script_url })
    }
}

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Network,
    /// The offline document, served because the network was unreachable.
    Offline,
    /// Network unreachable and no offline document stored.
    Missing,
}

impl FetchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Network => "network",
            Self::Offline => "offline",
            Self::Missing => "none",
        }
    }
}

/// Outcome of a request event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    /// Not a navigation; the platform handles it untouched.
    PassThrough,
    /// The worker answers. `response` is `None` only for [`FetchSource::Missing`].
    Respond { source: FetchSource, response: Option<CachedResponse> },
}

/// A worker registered under a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub script_url: String,
    pub scope: String,
    pub cache_name: String,
}

/// True for page navigations.
///
/// Runtimes that do not report navigation mode are covered by treating any
/// GET that accepts `text/html` as one.
pub fn is_navigation(request: &Request) -> bool {
    request.mode == RequestMode::Navigate
        || (request.method == Method::GET && request.accept().is_some_and(|a| a.contains("text/html")))
}

/// The installable background worker.
pub struct OfflineWorker<F> {
    config: WorkerConfig,
    cache: CacheDb,
    fetcher: F,
}

impl<F: Fetcher> OfflineWorker<F> {
    pub fn new(config: WorkerConfig, cache: CacheDb, fetcher: F) -> Self {
        Self { config, cache, fetcher }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Register the worker under its scope, running install to completion.
    ///
    /// The registration only exists once the offline document is stored.
    pub async fn register(&self) -> Result<Registration, Error> {
        self.install().await?;
        tracing::info!(
            script = %self.config.script_url,
            scope = %self.config.scope,
            cache = %self.config.cache_name,
            "worker registered"
        );
        Ok(Registration {
            script_url: self.config.script_url.to_string(),
            scope: self.config.scope.clone(),
            cache_name: self.config.cache_name.clone(),
        })
    }

    /// Fetch the offline document fresh from the network and store it.
    ///
    /// The entry is keyed by the logical offline URL even when the request
    /// went out with a cache-busting parameter. Resolves only after the put
    /// completes; a failed fetch fails the install and is not retried.
    pub async fn install(&self) -> Result<(), Error> {
        let now = chrono::Utc::now().timestamp_millis();
        let request = create_cache_busted_request(&self.fetcher, &self.config.offline_url, now);

        let response = self.fetcher.fetch(&request).await?;

        self.cache
            .put(&self.config.cache_name, Method::GET.as_str(), self.config.offline_url.as_str(), &response.to_cached())
            .await?;

        tracing::info!(
            url = %self.config.offline_url,
            fetched = %request.url,
            cache = %self.config.cache_name,
            "offline document installed"
        );

        Ok(())
    }

    /// The stored offline document, looked up by its logical key.
    pub async fn offline_document(&self) -> Result<Option<CachedResponse>, Error> {
        self.cache
            .match_in(&self.config.cache_name, Method::GET.as_str(), self.config.offline_url.as_str())
            .await
    }

    /// Answer a request event.
    ///
    /// Non-navigations pass through. Navigations are served from any store
    /// first; on a miss the network response is stored and served; if the
    /// network is unreachable the offline document is served instead.
    /// Nothing here returns an error to the platform.
    pub async fn handle_fetch(&self, request: &Request) -> FetchDecision {
        if !is_navigation(request) {
            return FetchDecision::PassThrough;
        }

        let method = request.method.as_str();
        let url = request.url.as_str();

        match self.cache.match_any(method, url).await {
            Ok(Some(hit)) => {
                tracing::debug!(%url, "cache hit");
                return FetchDecision::Respond { source: FetchSource::Cache, response: Some(hit) };
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(%url, error = %e, "cache lookup failed; trying network"),
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                let cached = response.to_cached();
                if let Err(e) = self.cache.put(&self.config.cache_name, method, url, &cached).await {
                    tracing::warn!(%url, error = %e, "failed to store navigation response");
                }
                FetchDecision::Respond { source: FetchSource::Network, response: Some(cached) }
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "fetch failed; serving offline page instead");
                match self.offline_document().await {
                    Ok(Some(doc)) => FetchDecision::Respond { source: FetchSource::Offline, response: Some(doc) },
                    Ok(None) => FetchDecision::Respond { source: FetchSource::Missing, response: None },
                    Err(e) => {
                        tracing::warn!(error = %e, "offline document lookup failed");
                        FetchDecision::Respond { source: FetchSource::Missing, response: None }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::CacheMode;
    use crate::testing::ScriptedFetcher;
    use std::sync::Arc;

    const OFFLINE: &str = "http://localhost:8080/offline";
    const OFFLINE_HTML: &str = "<html><body><h2>Offline</h2></body></html>";

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    async fn make_worker(fetcher: ScriptedFetcher) -> (OfflineWorker<Arc<ScriptedFetcher>>, Arc<ScriptedFetcher>) {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let config = WorkerConfig::from_app(&AppConfig::default()).unwrap();
        let fetcher = Arc::new(fetcher);
        (OfflineWorker::new(config, cache, fetcher.clone()), fetcher)
    }

    #[test]
    fn test_worker_config_from_app() {
        let app = AppConfig { cache_version: 2, offline_url: "/offline.html".into(), ..Default::default() };
        let config = WorkerConfig::from_app(&app).unwrap();
        assert_eq!(config.cache_name, "offline-v2");
        assert_eq!(config.offline_url.as_str(), "http://localhost:8080/offline.html");
        assert_eq!(config.scope, "/");
        assert_eq!(config.script_url.as_str(), "http://localhost:8080/generated-service-worker.js");
    }

    #[test]
    fn test_is_navigation() {
        assert!(is_navigation(&Request::navigate(url("http://localhost:8080/"))));

        let accept_html = Request::get(url("http://localhost:8080/")).with_accept("text/html");
        assert!(is_navigation(&accept_html));

        let post_html = Request::get(url("http://localhost:8080/"))
            .with_method(Method::POST)
            .with_accept("text/html");
        assert!(!is_navigation(&post_html));

        let image = Request::get(url("http://localhost:8080/logo.png")).with_accept("image/*");
        assert!(!is_navigation(&image));

        assert!(!is_navigation(&Request::get(url("http://localhost:8080/app.js"))));
    }

    #[tokio::test]
    async fn test_install_with_reload_directive() {
        let (worker, fetcher) = make_worker(ScriptedFetcher::new().respond(OFFLINE, 200, OFFLINE_HTML)).await;

        worker.install().await.unwrap();

        let sent = fetcher.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].cache, Some(CacheMode::Reload));
        assert_eq!(sent[0].url.as_str(), OFFLINE);

        let doc = worker.offline_document().await.unwrap().unwrap();
        assert_eq!(doc.text(), OFFLINE_HTML);
    }

    #[tokio::test]
    async fn test_install_with_query_fallback_keys_logical_url() {
        let fetcher = ScriptedFetcher::new().without_reload().respond(OFFLINE, 200, OFFLINE_HTML);
        let (worker, fetcher) = make_worker(fetcher).await;

        worker.install().await.unwrap();

        let sent = fetcher.requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].cache.is_none());
        assert!(sent[0].url.query().unwrap().starts_with("cachebust="));

        let doc = worker.offline_document().await.unwrap().unwrap();
        assert!(!doc.body.is_empty());
        assert_eq!(doc.text(), OFFLINE_HTML);
    }

    #[tokio::test]
    async fn test_install_fails_when_unreachable() {
        let (worker, _) = make_worker(ScriptedFetcher::new().fail(OFFLINE)).await;

        let result = worker.install().await;
        assert!(matches!(result, Err(Error::NetworkUnreachable(_))));
        assert!(worker.offline_document().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reinstall_overwrites_offline_document() {
        let (worker, _) = make_worker(ScriptedFetcher::new().respond(OFFLINE, 200, "v1")).await;
        worker.install().await.unwrap();

        let cache = worker.cache.clone();
        let config = worker.config.clone();
        let updated = OfflineWorker::new(config, cache, ScriptedFetcher::new().respond(OFFLINE, 200, "v2"));
        updated.install().await.unwrap();

        assert_eq!(updated.offline_document().await.unwrap().unwrap().text(), "v2");
    }

    #[tokio::test]
    async fn test_register_installs_first() {
        let (worker, _) = make_worker(ScriptedFetcher::new().respond(OFFLINE, 200, OFFLINE_HTML)).await;

        let registration = worker.register().await.unwrap();
        assert_eq!(registration.script_url, "http://localhost:8080/generated-service-worker.js");
        assert_eq!(registration.scope, "/");
        assert_eq!(registration.cache_name, "offline-v1");
        assert!(worker.offline_document().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_non_navigation_passes_through() {
        let (worker, fetcher) = make_worker(ScriptedFetcher::new()).await;

        let request = Request::get(url("http://localhost:8080/app.js")).with_accept("*/*");
        assert_eq!(worker.handle_fetch(&request).await, FetchDecision::PassThrough);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_navigation_is_cache_first() {
        let page = "http://localhost:8080/about";
        let (worker, fetcher) = make_worker(ScriptedFetcher::new().respond(page, 200, "<p>about</p>")).await;
        let request = Request::navigate(url(page));

        let first = worker.handle_fetch(&request).await;
        assert!(matches!(first, FetchDecision::Respond { source: FetchSource::Network, .. }));
        assert_eq!(fetcher.calls(), 1);

        let second = worker.handle_fetch(&request).await;
        match second {
            FetchDecision::Respond { source: FetchSource::Cache, response: Some(hit) } => {
                assert_eq!(hit.text(), "<p>about</p>");
            }
            other => panic!("expected cache hit, got {other:?}"),
        }
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_network_response_is_stored_in_offline_store() {
        let page = "http://localhost:8080/about";
        let (worker, _) = make_worker(ScriptedFetcher::new().respond(page, 200, "<p>about</p>")).await;

        worker.handle_fetch(&Request::navigate(url(page))).await;

        let stored = worker.cache.match_in("offline-v1", "GET", page).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_http_error_is_served_not_treated_as_offline() {
        let page = "http://localhost:8080/missing";
        let (worker, _) = make_worker(
            ScriptedFetcher::new()
                .respond(OFFLINE, 200, OFFLINE_HTML)
                .respond(page, 404, "not found"),
        )
        .await;
        worker.install().await.unwrap();

        match worker.handle_fetch(&Request::navigate(url(page))).await {
            FetchDecision::Respond { source: FetchSource::Network, response: Some(r) } => {
                assert_eq!(r.status, 404);
                assert_eq!(r.text(), "not found");
            }
            other => panic!("expected network response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_serves_offline_document_bytes() {
        let page = "http://localhost:8080/news";
        let (worker, fetcher) = make_worker(ScriptedFetcher::new().respond(OFFLINE, 200, OFFLINE_HTML)).await;
        worker.install().await.unwrap();
        fetcher.set_offline(true);

        let stored = worker.offline_document().await.unwrap().unwrap();
        match worker.handle_fetch(&Request::navigate(url(page))).await {
            FetchDecision::Respond { source: FetchSource::Offline, response: Some(served) } => {
                assert_eq!(served.body, stored.body);
            }
            other => panic!("expected offline document, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_without_offline_document() {
        let (worker, _) = make_worker(ScriptedFetcher::new()).await;

        let decision = worker.handle_fetch(&Request::navigate(url("http://localhost:8080/news"))).await;
        assert_eq!(decision, FetchDecision::Respond { source: FetchSource::Missing, response: None });
    }

    #[tokio::test]
    async fn test_cached_page_survives_going_offline() {
        let page = "http://localhost:8080/about";
        let (worker, fetcher) = make_worker(ScriptedFetcher::new().respond(page, 200, "<p>about</p>")).await;
        worker.handle_fetch(&Request::navigate(url(page))).await;
        fetcher.set_offline(true);

        let decision = worker.handle_fetch(&Request::navigate(url(page))).await;
        assert!(matches!(decision, FetchDecision::Respond { source: FetchSource::Cache, .. }));
    }
}
