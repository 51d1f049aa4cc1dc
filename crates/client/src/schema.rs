//! NewsArticle structured data written into the page's schema slot.

use pwa_core::PageEnvelope;
use pwa_core::page::dimension_value;
use serde_json::{Value, json};

pub const DATE_PUBLISHED: &str = "2015-02-05T08:00:00+08:00";
pub const DATE_MODIFIED: &str = "2015-02-05T09:20:00+08:00";

/// Build the article schema for an envelope.
///
/// Image and logo URLs are `siteUrl` concatenations; author, publisher and
/// dates are fixed.
pub fn article_schema(envelope: &PageEnvelope) -> Value {
    let page = &envelope.page;
    json!({
        "@context": "http://schema.org",
        "@type": "NewsArticle",
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": "https://google.com/article"
        },
        "headline": page.title,
        "image": {
            "@type": "ImageObject",
            "url": envelope.site_path(&page.thumbnail_path),
            "width": dimension_value(&page.thumbnail_width),
            "height": dimension_value(&page.thumbnail_height)
        },
        "datePublished": DATE_PUBLISHED,
        "dateModified": DATE_MODIFIED,
        "author": {
            "@type": "Person",
            "name": "John Doe"
        },
        "publisher": {
            "@type": "Organization",
            "name": "ACME Industries",
            "logo": {
                "@type": "ImageObject",
                "url": envelope.site_path("/images/logo.jpg"),
                "width": 600,
                "height": 60
            }
        },
        "description": page.description
    })
}
