//! cache_get tool implementation.
//!
//! Retrieves a stored response by request URL, searching every store.

use pwa_core::{AppConfig, CacheDb, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{json_result, resolve_url};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// URL the response was stored under, absolute or site-relative.
    pub url: String,

    /// Request method the response was stored under (default: GET).
    #[serde(default)]
    pub method: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub stored_at: String,
    /// Body decoded as UTF-8.
    pub body: String,
}

async fn lookup(config: &AppConfig, cache: &CacheDb, params: &CacheGetParams) -> Result<CacheGetOutput, Error> {
    let url = resolve_url(config, &params.url)?;
    let method = params.method.as_deref().unwrap_or("GET").to_ascii_uppercase();

    let response = cache
        .match_any(&method, url.as_str())
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{method} {url}")))?;

    Ok(CacheGetOutput {
        url: response.url.clone(),
        status: response.status,
        content_type: response.header("content-type").map(str::to_string),
        stored_at: response.stored_at.clone(),
        body: response.text(),
    })
}

/// Implementation of the cache_get tool.
pub async fn get_impl(config: &AppConfig, cache: &CacheDb, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    json_result(&lookup(config, cache, &params).await?)
}
