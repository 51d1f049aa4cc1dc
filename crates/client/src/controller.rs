//! Page-level content refresh.
//!
//! On navigation, history changes and connectivity changes the controller
//! fetches replacement content (JSON, or HTML normalized to the JSON shape),
//! patches the page surface and rewrites the page metadata. Any failure ends
//! on the offline page.
//!
//! Each refresh has a fetch phase that does not hold the page and an apply
//! phase that does. Nothing cancels an in-flight refresh, so when refreshes
//! overlap the one that resolves last wins.

use pwa_core::{AppConfig, Error, PageEnvelope, RenderMode, UpdateMode};
use reqwest::Url;
use tokio::sync::{Mutex, MutexGuard};

use crate::extract::normalize_html;
use crate::fetch::{Fetcher, Request, json_variant, resolve};
use crate::page::{MetaTag, PageSurface};
use crate::schema::article_schema;

/// Immutable controller settings, fixed at page load.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub render_mode: RenderMode,
    pub update_mode: UpdateMode,
    /// Base for resolving relative page URLs.
    pub site_origin: Url,
}

impl RefreshConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        Ok(Self {
            render_mode: config.render_mode,
            update_mode: config.update_mode,
            site_origin: config.origin().map_err(|e| Error::InvalidUrl(e.to_string()))?,
        })
    }
}

/// What a refresh did to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Update mode is disabled; the page was left alone.
    Skipped,
    Updated,
    /// The fetch or decode failed and the offline page was shown.
    Offline,
}

impl RefreshOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Updated => "updated",
            Self::Offline => "offline",
        }
    }
}

/// A click on an element of the page.
#[derive(Debug, Clone)]
pub struct LinkClick {
    pub href: String,
    pub text: String,
    /// Element is an `<a>`.
    pub is_anchor: bool,
    /// Element carries the `external` class.
    pub external: bool,
}

/// Whether the platform should follow a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Let the browser navigate normally.
    Navigate,
    /// Default prevented; the controller refreshed in place.
    Intercepted(RefreshOutcome),
}

pub struct ContentRefreshController<F, P> {
    config: RefreshConfig,
    fetcher: F,
    page: Mutex<P>,
}

impl<F: Fetcher, P: PageSurface> ContentRefreshController<F, P> {
    pub fn new(config: RefreshConfig, fetcher: F, page: P) -> Self {
        Self { config, fetcher, page: Mutex::new(page) }
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Lock the page surface.
    pub async fn page(&self) -> MutexGuard<'_, P> {
        self.page.lock().await
    }

    pub fn into_page(self) -> P {
        self.page.into_inner()
    }

    /// Fetch content for `url` and swap it into the page.
    ///
    /// Fetch and decode failures show the offline page. The only error
    /// returned is a surface that cannot display even that.
    pub async fn update_page_content(&self, url: &str) -> Result<RefreshOutcome, Error> {
        if self.config.update_mode == UpdateMode::Disabled {
            tracing::info!(%url, "dynamic content update attempted but update mode is disabled");
            return Ok(RefreshOutcome::Skipped);
        }

        match self.fetch_envelope(url).await {
            Ok(envelope) => {
                let mut page = self.page.lock().await;
                match apply_envelope(&mut *page, &envelope) {
                    Ok(()) => Ok(RefreshOutcome::Updated),
                    Err(e) => {
                        tracing::warn!(%url, error = %e, "page update failed; showing offline page");
                        apply_envelope(&mut *page, &PageEnvelope::offline())?;
                        Ok(RefreshOutcome::Offline)
                    }
                }
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "fetch error; showing offline page");
                self.show_offline_page().await?;
                Ok(RefreshOutcome::Offline)
            }
        }
    }

    /// Fetch phase: resolve, fetch and decode without touching the page.
    async fn fetch_envelope(&self, url: &str) -> Result<PageEnvelope, Error> {
        let target = match self.config.update_mode {
            UpdateMode::Json => json_variant(url),
            _ => url.to_string(),
        };
        let target = resolve(&self.config.site_origin, &target).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self.fetcher.fetch(&Request::get(target)).await?;
        let body = response.text();

        match self.config.update_mode {
            UpdateMode::Html => Ok(normalize_html(&body)?),
            _ => PageEnvelope::from_json(&body).map_err(|e| Error::InvalidPayload(e.to_string())),
        }
    }

    /// Normalize a full HTML page and apply it.
    ///
    /// Extraction failures are returned as [`Error::Extract`] before the page
    /// is touched.
    pub async fn process_html(&self, raw_html: &str) -> Result<(), Error> {
        let envelope = normalize_html(raw_html)?;
        self.process_json(&envelope).await
    }

    /// Apply an envelope to the page.
    pub async fn process_json(&self, envelope: &PageEnvelope) -> Result<(), Error> {
        let mut page = self.page.lock().await;
        apply_envelope(&mut *page, envelope)
    }

    /// True when the content region holds nothing but whitespace.
    pub async fn is_rendered_page_empty(&self) -> Result<bool, Error> {
        let page = self.page.lock().await;
        Ok(page.content_html()?.trim().is_empty())
    }

    /// Mirror connectivity onto the page's `offline` class.
    pub async fn check_online_offline_state(&self, online: bool) {
        self.page.lock().await.set_offline(!online);
    }

    pub async fn show_offline_page(&self) -> Result<(), Error> {
        self.process_json(&PageEnvelope::offline()).await
    }

    async fn current_location(&self) -> String {
        self.page.lock().await.location()
    }

    async fn refresh_current(&self) -> Result<RefreshOutcome, Error> {
        let location = self.current_location().await;
        self.update_page_content(&location).await
    }

    /// Page finished loading.
    ///
    /// Client rendering always fetches; hybrid rendering fetches only when the
    /// server delivered an empty shell.
    pub async fn on_load(&self, online: bool) -> Result<Option<RefreshOutcome>, Error> {
        self.check_online_offline_state(online).await;

        match self.config.render_mode {
            RenderMode::Server => Ok(None),
            RenderMode::Client => self.refresh_current().await.map(Some),
            RenderMode::Hybrid => {
                if self.is_rendered_page_empty().await? {
                    self.refresh_current().await.map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Browser history moved (back/forward).
    pub async fn on_popstate(&self) -> Result<Option<RefreshOutcome>, Error> {
        if self.config.render_mode == RenderMode::Server {
            return Ok(None);
        }
        self.refresh_current().await.map(Some)
    }

    pub async fn on_link_click(&self, click: &LinkClick) -> Result<LinkAction, Error> {
        if self.config.render_mode == RenderMode::Server || self.config.update_mode == UpdateMode::Disabled {
            return Ok(LinkAction::Navigate);
        }
        if click.external || !click.is_anchor {
            return Ok(LinkAction::Navigate);
        }

        let location = self.current_location().await;
        let base = Url::parse(&location).unwrap_or_else(|_| self.config.site_origin.clone());
        let target = resolve(&base, &click.href).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        self.page.lock().await.push_history(target.as_str(), &click.text);

        self.update_page_content(target.as_str()).await.map(LinkAction::Intercepted)
    }

    pub async fn on_offline(&self) {
        tracing::info!("transitioned offline");
        self.check_online_offline_state(false).await;
    }

    /// Connectivity came back; client and hybrid pages refetch.
    pub async fn on_online(&self) -> Result<Option<RefreshOutcome>, Error> {
        tracing::info!("transitioned online");
        self.check_online_offline_state(true).await;

        match self.config.render_mode {
            RenderMode::Client | RenderMode::Hybrid => self.refresh_current().await.map(Some),
            RenderMode::Server => Ok(None),
        }
    }
}

/// Write an envelope onto a page surface.
///
/// The canonical link always gets the page's current location; the envelope
/// canonical only feeds `og:url`. Writing the same envelope twice leaves the
/// page unchanged. A page missing any anchor is left untouched.
pub fn apply_envelope<P: PageSurface + ?Sized>(page: &mut P, envelope: &PageEnvelope) -> Result<(), Error> {
    tracing::debug!(title = %envelope.page.title, "updating page with envelope");

    page.check_anchors()?;

    let canonical = page.location();
    let content = &envelope.page;

    page.set_content_html(envelope.content_html())?;

    let schema =
        serde_json::to_string(&article_schema(envelope)).map_err(|e| Error::InvalidPayload(e.to_string()))?;

    page.set_document_title(&content.title)?;
    page.set_heading(&content.title)?;
    page.set_structured_data(&schema)?;

    page.set_canonical(&canonical)?;

    page.set_meta(MetaTag::OgTitle, &content.title)?;
    page.set_meta(MetaTag::OgUrl, &envelope.site_path(&content.canonical))?;
    page.set_meta(MetaTag::OgImage, &envelope.site_path(&content.meta_image))?;

    page.set_meta(MetaTag::TwitterTitle, &content.title)?;
    page.set_meta(MetaTag::TwitterDescription, &content.description)?;
    page.set_meta(MetaTag::TwitterImage, &envelope.site_path(&content.meta_image))?;

    page.set_copyright(&format!("Image is copyright of {}", content.copyright))?;

    Ok(())
}
