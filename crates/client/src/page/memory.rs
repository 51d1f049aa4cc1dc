//! In-memory page surface.

use std::collections::BTreeMap;

use pwa_core::Error;
use scraper::Html;
use serde::Serialize;

use super::{MetaTag, PageSurface};
use crate::extract::{CONTENT_SELECTOR, SCHEMA_SELECTOR, selector};

const DOCUMENT_TITLE_SELECTOR: &str = "html > head > title";
const HEADING_SELECTOR: &str = "h2";
const CANONICAL_LINK_SELECTOR: &str = "html > head > link[rel=canonical]";
const COPYRIGHT_SELECTOR: &str = ".image-copyright p";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
}

/// A page held as one slot per anchor.
///
/// `None` means the anchor is missing and writes to it fail. Meta tags are
/// keyed by their document name (`og:title`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryPage {
    pub location: String,
    pub offline: bool,
    pub content: Option<String>,
    pub structured_data: Option<String>,
    pub document_title: Option<String>,
    pub heading: Option<String>,
    pub canonical: Option<String>,
    pub meta: BTreeMap<String, String>,
    pub copyright: Option<String>,
    pub history: Vec<HistoryEntry>,
}

impl MemoryPage {
    /// A page at `location` with every anchor present and empty.
    pub fn with_all_anchors(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            content: Some(String::new()),
            structured_data: Some(String::new()),
            document_title: Some(String::new()),
            heading: Some(String::new()),
            canonical: Some(String::new()),
            meta: MetaTag::ALL.iter().map(|t| (t.name().to_string(), String::new())).collect(),
            copyright: Some(String::new()),
            ..Default::default()
        }
    }

    /// Load the anchors of a server-rendered shell.
    ///
    /// Anchors absent from `html` stay missing.
    pub fn from_shell(location: impl Into<String>, html: &str) -> Self {
        let document = Html::parse_document(html);
        let first = |css: &str| document.select(&selector(css)).next();
        let text = |css: &str| first(css).map(|el| el.text().collect::<String>());

        let meta = MetaTag::ALL
            .iter()
            .filter_map(|tag| {
                first(&tag.selector())
                    .map(|el| (tag.name().to_string(), el.value().attr("content").unwrap_or_default().to_string()))
            })
            .collect();

        Self {
            location: location.into(),
            offline: false,
            content: first(CONTENT_SELECTOR).map(|el| el.inner_html()),
            structured_data: text(SCHEMA_SELECTOR),
            document_title: text(DOCUMENT_TITLE_SELECTOR),
            heading: text(HEADING_SELECTOR),
            canonical: first(CANONICAL_LINK_SELECTOR).map(|el| el.value().attr("href").unwrap_or_default().to_string()),
            meta,
            copyright: text(COPYRIGHT_SELECTOR),
            history: Vec::new(),
        }
    }

    /// Current value of a meta tag, if the tag exists.
    pub fn meta(&self, tag: MetaTag) -> Option<&str> {
        self.meta.get(tag.name()).map(String::as_str)
    }
}

fn write(slot: &mut Option<String>, anchor: &str, value: &str) -> Result<(), Error> {
    match slot {
        Some(current) => {
            value.clone_into(current);
            Ok(())
        }
        None => Err(Error::MissingAnchor(anchor.to_string())),
    }
}

fn present(slot: &Option<String>, anchor: &str) -> Result<(), Error> {
    match slot {
        Some(_) => Ok(()),
        None => Err(Error::MissingAnchor(anchor.to_string())),
    }
}

impl PageSurface for MemoryPage {
    fn check_anchors(&self) -> Result<(), Error> {
        present(&self.content, CONTENT_SELECTOR)?;
        present(&self.document_title, DOCUMENT_TITLE_SELECTOR)?;
        present(&self.heading, HEADING_SELECTOR)?;
        present(&self.structured_data, SCHEMA_SELECTOR)?;
        present(&self.canonical, CANONICAL_LINK_SELECTOR)?;
        if let Some(tag) = MetaTag::ALL.iter().find(|tag| !self.meta.contains_key(tag.name())) {
            return Err(Error::MissingAnchor(tag.selector()));
        }
        present(&self.copyright, COPYRIGHT_SELECTOR)
    }

    fn content_html(&self) -> Result<String, Error> {
        self.content
            .clone()
            .ok_or_else(|| Error::MissingAnchor(CONTENT_SELECTOR.to_string()))
    }

    fn set_content_html(&mut self, html: &str) -> Result<(), Error> {
        write(&mut self.content, CONTENT_SELECTOR, html)
    }

    fn set_structured_data(&mut self, json: &str) -> Result<(), Error> {
        write(&mut self.structured_data, SCHEMA_SELECTOR, json)
    }

    fn set_document_title(&mut self, title: &str) -> Result<(), Error> {
        write(&mut self.document_title, DOCUMENT_TITLE_SELECTOR, title)
    }

    fn set_heading(&mut self, text: &str) -> Result<(), Error> {
        write(&mut self.heading, HEADING_SELECTOR, text)
    }

    fn set_canonical(&mut self, href: &str) -> Result<(), Error> {
        write(&mut self.canonical, CANONICAL_LINK_SELECTOR, href)
    }

    fn set_meta(&mut self, tag: MetaTag, content: &str) -> Result<(), Error> {
        match self.meta.get_mut(tag.name()) {
            Some(current) => {
                content.clone_into(current);
                Ok(())
            }
            None => Err(Error::MissingAnchor(tag.selector())),
        }
    }

    fn set_copyright(&mut self, text: &str) -> Result<(), Error> {
        write(&mut self.copyright, COPYRIGHT_SELECTOR, text)
    }

    fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn location(&self) -> String {
        self.location.clone()
    }

    fn push_history(&mut self, url: &str, title: &str) {
        self.history.push(HistoryEntry { url: url.to_string(), title: title.to_string() });
        url.clone_into(&mut self.location);
    }
}
