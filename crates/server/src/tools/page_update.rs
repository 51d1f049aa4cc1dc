//! page_update tool implementation.
//!
//! Runs a content refresh against an in-memory page, optionally seeded from a
//! server-rendered shell, and reports what the page looks like afterwards.

use std::str::FromStr;

use pwa_client::{ContentRefreshController, Fetcher, MemoryPage, RefreshConfig};
use pwa_core::{AppConfig, Error, UpdateMode};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{json_result, resolve_url};

/// Input parameters for the page_update tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageUpdateParams {
    /// Page to refresh, absolute or site-relative.
    pub url: String,

    /// Server-rendered HTML the page starts from. When omitted every
    /// anchor starts out present and empty.
    #[serde(default)]
    pub shell_html: Option<String>,

    /// Override the configured update mode: "json", "html" or "disabled".
    #[serde(default)]
    pub update_mode: Option<String>,
}

/// Output from the page_update tool.
#[derive(Debug, Clone, Serialize)]
pub struct PageUpdateOutput {
    /// `updated`, `offline` or `skipped`.
    pub outcome: String,
    pub update_mode: String,
    pub page: MemoryPage,
}

async fn update<F: Fetcher>(config: &AppConfig, fetcher: F, params: &PageUpdateParams) -> Result<PageUpdateOutput, Error> {
    let location = resolve_url(config, &params.url)?;

    let mut refresh = RefreshConfig::from_app(config)?;
    if let Some(mode) = params.update_mode.as_deref() {
        refresh.update_mode = UpdateMode::from_str(mode).map_err(|e| Error::InvalidInput(e.to_string()))?;
    }
    let update_mode = refresh.update_mode;

    let page = match params.shell_html.as_deref() {
        Some(html) => MemoryPage::from_shell(location.as_str(), html),
        None => MemoryPage::with_all_anchors(location.as_str()),
    };

    let controller = ContentRefreshController::new(refresh, fetcher, page);
    let outcome = controller.update_page_content(location.as_str()).await?;

    tracing::debug!(url = %location, outcome = outcome.as_str(), "page update finished");

    Ok(PageUpdateOutput {
        outcome: outcome.as_str().into(),
        update_mode: update_mode.as_str().into(),
        page: controller.into_page(),
    })
}

/// Implementation of the page_update tool.
pub async fn page_update_impl<F: Fetcher>(
    config: &AppConfig, fetcher: F, params: PageUpdateParams,
) -> Result<CallToolResult, McpError> {
    json_result(&update(config, fetcher, &params).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::StaticFetcher;
    use pwa_client::MetaTag;
    use std::sync::Arc;

    const ABOUT_JSON: &str = r#"{
        "page": {"title": "About", "canonical": "/about", "content": "<p>About us</p>",
                 "description": "Who we are", "metaImage": "/images/about.jpg", "copyright": "ACME"},
        "siteUrl": "https://example.com"
    }"#;

    fn params(url: &str) -> PageUpdateParams {
        PageUpdateParams { url: url.into(), shell_html: None, update_mode: None }
    }

    #[tokio::test]
    async fn test_update_json_mode() {
        let fetcher = Arc::new(StaticFetcher::default().with("http://localhost:8080/about.json", 200, ABOUT_JSON));

        let output = update(&AppConfig::default(), fetcher.clone(), &params("/about")).await.unwrap();
        assert_eq!(output.outcome, "updated");
        assert_eq!(output.update_mode, "json");
        assert_eq!(output.page.location, "http://localhost:8080/about");
        assert_eq!(output.page.heading.as_deref(), Some("About"));
        assert_eq!(output.page.canonical.as_deref(), Some("http://localhost:8080/about"));
        assert_eq!(output.page.meta(MetaTag::OgUrl), Some("https://example.com/about"));
        assert_eq!(output.page.copyright.as_deref(), Some("Image is copyright of ACME"));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_update_offline() {
        let output = update(&AppConfig::default(), StaticFetcher::default(), &params("/about")).await.unwrap();
        assert_eq!(output.outcome, "offline");
        assert_eq!(output.page.document_title.as_deref(), Some("Offline"));
        assert_eq!(output.page.content.as_deref(), Some("You are offline."));
    }

    #[tokio::test]
    async fn test_update_mode_override() {
        let fetcher = Arc::new(StaticFetcher::default());
        let request = PageUpdateParams { update_mode: Some("disabled".into()), ..params("/about") };

        let output = update(&AppConfig::default(), fetcher.clone(), &request).await.unwrap();
        assert_eq!(output.outcome, "skipped");
        assert_eq!(output.update_mode, "disabled");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_update_invalid_mode() {
        let request = PageUpdateParams { update_mode: Some("xml".into()), ..params("/about") };

        let err = page_update_impl(&AppConfig::default(), StaticFetcher::default(), request)
            .await
            .unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_update_shell_missing_anchor() {
        let fetcher = StaticFetcher::default().with("http://localhost:8080/about.json", 200, ABOUT_JSON);
        let request = PageUpdateParams { shell_html: Some("<html><body></body></html>".into()), ..params("/about") };

        let err = update(&AppConfig::default(), fetcher, &request).await.unwrap_err();
        assert!(matches!(err, Error::MissingAnchor(_)));
    }
}
