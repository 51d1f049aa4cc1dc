//! Normalization of full HTML pages into the JSON envelope shape.
//!
//! ### Required anchors
//! - `#content`: content region, copied as inner HTML.
//! - `#schema-data`: JSON-LD block supplying description and image.
//! - `title`: page title.
//! - `link[rel=canonical]`: canonical path, read from `href`.
//!
//! A missing anchor is a named [`ExtractFailure`], never a generic error, so
//! callers can log exactly what the server left out.

use pwa_core::page::json_text;
use pwa_core::{ExtractFailure, PageContent, PageEnvelope};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

pub const CONTENT_SELECTOR: &str = "#content";
pub const SCHEMA_SELECTOR: &str = "#schema-data";
pub const TITLE_SELECTOR: &str = "title";
pub const CANONICAL_SELECTOR: &str = "link[rel=canonical]";

/// Image fields of the schema block: url, width, height.
#[derive(Debug, Default)]
struct SchemaImage {
    url: String,
    width: String,
    height: String,
}

fn text_field(value: Option<&Value>) -> String {
    value.map(json_text).unwrap_or_default()
}

/// Read `image` as schema.org allows it: an ImageObject, a bare URL, or an
/// array of either (first entry wins).
fn schema_image(schema: &Value) -> SchemaImage {
    let image = match schema.get("image") {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };

    match image {
        Some(Value::String(url)) => SchemaImage { url: url.clone(), ..Default::default() },
        Some(object @ Value::Object(_)) => SchemaImage {
            url: text_field(object.get("url")),
            width: text_field(object.get("width")),
            height: text_field(object.get("height")),
        },
        _ => SchemaImage::default(),
    }
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    document.select(&selector(css)).next()
}

/// Normalize a fetched HTML page into a [`PageEnvelope`].
///
/// `copyright` and `siteUrl` are always empty: HTML pages do not carry them.
pub fn normalize_html(raw_html: &str) -> Result<PageEnvelope, ExtractFailure> {
    let document = Html::parse_document(raw_html);

    let content = select_first(&document, CONTENT_SELECTOR).ok_or(ExtractFailure::MissingContent)?;
    let content_html = content.inner_html();

    let schema_tag = select_first(&document, SCHEMA_SELECTOR).ok_or(ExtractFailure::MissingStructuredData)?;
    let schema_text: String = schema_tag.text().collect();
    let schema: Value = serde_json::from_str(schema_text.trim())
        .map_err(|e| ExtractFailure::InvalidStructuredData(e.to_string()))?;
    let description = text_field(schema.get("description"));
    let image = schema_image(&schema);

    let title = select_first(&document, TITLE_SELECTOR).ok_or(ExtractFailure::MissingTitle)?;
    let title: String = title.text().collect();

    let canonical = select_first(&document, CANONICAL_SELECTOR).ok_or(ExtractFailure::MissingCanonical)?;
    let canonical = canonical.value().attr("href").unwrap_or_default().to_string();

    Ok(PageEnvelope {
        page: PageContent {
            title,
            canonical,
            content: Some(content_html),
            description,
            meta_image: image.url.clone(),
            thumbnail_path: image.url,
            thumbnail_width: image.width,
            thumbnail_height: image.height,
            copyright: String::new(),
        },
        site_url: String::new(),
    })
}
