//! MCP tool implementations.
//!
//! This module contains all tools exposed by the pwa-offline server.

pub mod cache;
pub mod page_update;
pub mod worker;

pub use page_update::{PageUpdateOutput, PageUpdateParams};
pub use worker::{WorkerFetchOutput, WorkerFetchParams, WorkerInstallOutput};

use pwa_core::{AppConfig, Error};
use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use url::Url;

/// Resolve a tool URL argument against the configured site origin.
pub(crate) fn resolve_url(config: &AppConfig, input: &str) -> Result<Url, Error> {
    if input.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()));
    }
    let origin = config.origin().map_err(|e| Error::InvalidUrl(e.to_string()))?;
    pwa_client::fetch::resolve(&origin, input).map_err(|e| Error::InvalidUrl(e.to_string()))
}

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
