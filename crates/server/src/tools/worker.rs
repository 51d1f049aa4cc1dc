//! worker_install and worker_fetch tool implementations.
//!
//! Drive the offline worker's install and request-interception handlers.

use pwa_client::{FetchDecision, Fetcher, OfflineWorker, Request};
use pwa_core::{AppConfig, Error};
use reqwest::Method;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{json_result, resolve_url};

/// Output from the worker_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerInstallOutput {
    /// Store the offline document was written to.
    pub cache: String,
    /// Logical URL the offline document is keyed by.
    pub offline_url: String,
    pub status: String,
}

async fn install<F: Fetcher>(worker: &OfflineWorker<F>) -> Result<WorkerInstallOutput, Error> {
    worker.install().await?;

    let config = worker.config();
    Ok(WorkerInstallOutput {
        cache: config.cache_name.clone(),
        offline_url: config.offline_url.to_string(),
        status: "installed".into(),
    })
}

/// Implementation of the worker_install tool.
pub async fn install_impl<F: Fetcher>(worker: &OfflineWorker<F>) -> Result<CallToolResult, McpError> {
    json_result(&install(worker).await?)
}

/// Input parameters for the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Absolute URL or site-relative path.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Optional Accept header.
    #[serde(default)]
    pub accept: Option<String>,

    /// Mark the request as a top-level navigation.
    #[serde(default)]
    pub navigate: bool,
}

/// Output from the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// Whether the worker answered the request itself.
    pub intercepted: bool,
    /// `cache`, `network`, `offline`, `none` or `passthrough`.
    pub source: String,
    pub status: Option<u16>,
    pub body: Option<String>,
}

fn build_request(config: &AppConfig, params: &WorkerFetchParams) -> Result<Request, Error> {
    let url = resolve_url(config, &params.url)?;

    let method = match params.method.as_deref() {
        Some(m) => Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {m}")))?,
        None => Method::GET,
    };

    let mut request = if params.navigate { Request::navigate(url) } else { Request::get(url) };
    request = request.with_method(method);
    if let Some(accept) = &params.accept {
        request = request.with_accept(accept);
    }
    Ok(request)
}

async fn intercept<F: Fetcher>(
    config: &AppConfig, worker: &OfflineWorker<F>, params: &WorkerFetchParams,
) -> Result<WorkerFetchOutput, Error> {
    let request = build_request(config, params)?;

    let output = match worker.handle_fetch(&request).await {
        FetchDecision::PassThrough => {
            WorkerFetchOutput { intercepted: false, source: "passthrough".into(), status: None, body: None }
        }
        FetchDecision::Respond { source, response } => WorkerFetchOutput {
            intercepted: true,
            source: source.as_str().into(),
            status: response.as_ref().map(|r| r.status),
            body: response.as_ref().map(|r| r.text()),
        },
    };

    Ok(output)
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl<F: Fetcher>(
    config: &AppConfig, worker: &OfflineWorker<F>, params: WorkerFetchParams,
) -> Result<CallToolResult, McpError> {
    json_result(&intercept(config, worker, &params).await?)
}
