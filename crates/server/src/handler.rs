//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, get_impl};
use crate::tools::page_update::{PageUpdateParams, page_update_impl};
use crate::tools::worker::{WorkerFetchParams, fetch_impl, install_impl};

use pwa_client::{Fetcher, OfflineWorker};
use pwa_core::{AppConfig, CacheDb};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// Transport shared by the worker and page updates.
pub type SharedFetcher = Arc<dyn Fetcher>;

/// Everything the tools need, built once at startup.
pub struct ServerState {
    pub config: AppConfig,
    pub cache: CacheDb,
    pub fetcher: SharedFetcher,
    pub worker: OfflineWorker<SharedFetcher>,
}

/// The main MCP server handler for pwa-offline.
#[derive(Clone)]
pub struct PwaServer {
    state: Arc<ServerState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PwaServer {
    /// Create a new server handler.
    pub fn new(state: ServerState) -> Self {
        Self { state: Arc::new(state), tool_router: Self::tool_router() }
    }

    #[tool(description = "Fetch the offline fallback page fresh from the network and store it in the active cache.")]
    async fn worker_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.state.worker).await
    }

    /// Run a request through the worker's fetch handler.
    ///
    /// Navigations are answered cache-first with network and offline
    /// fallbacks; anything else passes through untouched.
    #[tool(
        description = "Intercept a request as the offline worker would. Returns the response source (cache, network, offline, none or passthrough) and the response."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.state.config, &self.state.worker, params.0).await
    }

    #[tool(
        description = "Refresh a page's content region and metadata from the server in JSON or HTML mode. Returns the resulting page state."
    )]
    async fn page_update(&self, params: Parameters<PageUpdateParams>) -> Result<CallToolResult, McpError> {
        page_update_impl(&self.state.config, self.state.fetcher.clone(), params.0).await
    }

    #[tool(description = "Look up a stored response by URL across all cache stores.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.state.config, &self.state.cache, params.0).await
    }
}

impl ServerHandler for PwaServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pwa-offline".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
