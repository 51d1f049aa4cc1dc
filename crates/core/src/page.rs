//! Normalized page content and its envelope.
//!
//! The server delivers this shape directly as `<page>.json`; HTML responses
//! are normalized into it by the client.

use serde::{Deserialize, Deserializer, Serialize};

/// Page payload carried by a [`PageEnvelope`].
///
/// Every text field defaults to the empty string. `content` stays optional so
/// a payload without a body can be told apart from an empty one; both render
/// as an empty content region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub canonical: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub meta_image: String,
    #[serde(default)]
    pub thumbnail_path: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub thumbnail_width: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub thumbnail_height: String,
    #[serde(default)]
    pub copyright: String,
}

/// `{page, siteUrl}` wrapper around normalized page content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    pub page: PageContent,
    #[serde(default)]
    pub site_url: String,
}

impl PageEnvelope {
    /// The canned envelope shown whenever a refresh fails.
    pub fn offline() -> Self {
        Self {
            page: PageContent {
                title: "Offline".into(),
                canonical: "/".into(),
                content: Some("You are offline.".into()),
                ..Default::default()
            },
            site_url: String::new(),
        }
    }

    /// Decode an envelope from the text of a JSON response.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Content HTML, or the empty string when the payload carries none.
    pub fn content_html(&self) -> &str {
        self.page.content.as_deref().unwrap_or("")
    }

    /// `siteUrl` joined with a site-relative path.
    pub fn site_path(&self, path: &str) -> String {
        format!("{}{}", self.site_url, path)
    }
}

/// Dimension value for schema markup: integers stay numeric, anything else is text.
pub fn dimension_value(raw: &str) -> serde_json::Value {
    match raw.trim().parse::<u64>() {
        Ok(n) => serde_json::Value::from(n),
        Err(_) => serde_json::Value::from(raw),
    }
}

/// Accept a JSON number or string, keeping it as text. `null` becomes `""`.
pub fn number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(json_text(&value))
}

/// A loosely typed JSON value as text: strings unquoted, `null` as `""`.
pub fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_envelope() {
        let envelope = PageEnvelope::offline();
        assert_eq!(envelope.page.title, "Offline");
        assert_eq!(envelope.page.canonical, "/");
        assert_eq!(envelope.content_html(), "You are offline.");
        assert_eq!(envelope.page.description, "");
        assert_eq!(envelope.page.thumbnail_width, "");
        assert_eq!(envelope.site_url, "");
    }

    #[test]
    fn test_from_json_full() {
        let json = r#"{
            "page": {
                "title": "Hello",
                "canonical": "/hello",
                "content": "<p>Hi</p>",
                "description": "A greeting",
                "metaImage": "/images/hello.jpg",
                "thumbnailPath": "/images/hello-thumb.jpg",
                "thumbnailWidth": 800,
                "thumbnailHeight": "600",
                "copyright": "ACME"
            },
            "siteUrl": "https://example.com"
        }"#;

        let envelope = PageEnvelope::from_json(json).unwrap();
        assert_eq!(envelope.page.title, "Hello");
        assert_eq!(envelope.page.meta_image, "/images/hello.jpg");
        assert_eq!(envelope.page.thumbnail_width, "800");
        assert_eq!(envelope.page.thumbnail_height, "600");
        assert_eq!(envelope.site_path("/hello"), "https://example.com/hello");
    }

    #[test]
    fn test_from_json_defaults() {
        let envelope = PageEnvelope::from_json(r#"{"page": {"title": "Bare"}}"#).unwrap();
        assert_eq!(envelope.page.title, "Bare");
        assert!(envelope.page.content.is_none());
        assert_eq!(envelope.content_html(), "");
        assert_eq!(envelope.page.copyright, "");
        assert_eq!(envelope.site_url, "");
    }

    #[test]
    fn test_from_json_rejects_missing_page() {
        assert!(PageEnvelope::from_json(r#"{"siteUrl": ""}"#).is_err());
        assert!(PageEnvelope::from_json("<html></html>").is_err());
    }

    #[test]
    fn test_dimension_value() {
        assert_eq!(dimension_value("600"), serde_json::json!(600));
        assert_eq!(dimension_value(""), serde_json::json!(""));
        assert_eq!(dimension_value("auto"), serde_json::json!("auto"));
    }
}
