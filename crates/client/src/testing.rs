//! Scripted transport for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use pwa_core::Error;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::fetch::{Fetcher, Request, Response};

#[derive(Clone)]
enum Route {
    Respond { status: u16, body: String, delay: Duration },
    Fail,
}

/// Answers from a fixed route table and counts every fetch.
///
/// Routes match on the full URL first, then on the URL without its query.
/// Unknown URLs fail as unreachable.
pub(crate) struct ScriptedFetcher {
    routes: HashMap<String, Route>,
    honors_reload: bool,
    offline: AtomicBool,
    calls: AtomicUsize,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self {
            routes: HashMap::new(),
            honors_reload: true,
            offline: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Behave like a runtime that drops the reload directive.
    pub(crate) fn without_reload(mut self) -> Self {
        self.honors_reload = false;
        self
    }

    pub(crate) fn respond(self, url: &str, status: u16, body: &str) -> Self {
        self.respond_after(url, status, body, Duration::ZERO)
    }

    pub(crate) fn respond_after(mut self, url: &str, status: u16, body: &str, delay: Duration) -> Self {
        self.routes
            .insert(url.to_string(), Route::Respond { status, body: body.to_string(), delay });
        self
    }

    pub(crate) fn fail(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Route::Fail);
        self
    }

    /// Fail every request from now on.
    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn route(&self, request: &Request) -> Option<Route> {
        if let Some(route) = self.routes.get(request.url.as_str()) {
            return Some(route.clone());
        }
        let mut bare = request.url.clone();
        bare.set_query(None);
        self.routes.get(bare.as_str()).cloned()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    fn prepare(&self, mut request: Request) -> Request {
        if !self.honors_reload {
            request.cache = None;
        }
        request
    }

    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::NetworkUnreachable(format!("{}: offline", request.url)));
        }

        match self.route(request) {
            Some(Route::Respond { status, body, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let mut headers = HeaderMap::new();
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
                Ok(Response {
                    url: request.url.clone(),
                    status: StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
                    headers,
                    body: Bytes::from(body),
                })
            }
            Some(Route::Fail) | None => Err(Error::NetworkUnreachable(format!("{}: connection refused", request.url))),
        }
    }
}
