//! The rendering surface the page controller writes to.
//!
//! [`PageSurface`] names every anchor the controller touches, so the refresh
//! logic runs the same against a live document or [`MemoryPage`].

mod memory;

pub use memory::{HistoryEntry, MemoryPage};

use pwa_core::Error;
use serde::{Deserialize, Serialize};

/// Social metadata tags rewritten on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetaTag {
    OgTitle,
    OgUrl,
    OgImage,
    TwitterTitle,
    TwitterDescription,
    TwitterImage,
}

impl MetaTag {
    pub const ALL: [MetaTag; 6] = [
        MetaTag::OgTitle,
        MetaTag::OgUrl,
        MetaTag::OgImage,
        MetaTag::TwitterTitle,
        MetaTag::TwitterDescription,
        MetaTag::TwitterImage,
    ];

    /// Tag name as it appears in the document.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OgTitle => "og:title",
            Self::OgUrl => "og:url",
            Self::OgImage => "og:image",
            Self::TwitterTitle => "twitter:title",
            Self::TwitterDescription => "twitter:description",
            Self::TwitterImage => "twitter:image",
        }
    }

    /// Selector for the tag in a document head.
    ///
    /// Open Graph tags are keyed by `property`, Twitter tags by `name`.
    pub fn selector(&self) -> String {
        match self {
            Self::OgTitle | Self::OgUrl | Self::OgImage => format!("html > head > meta[property=\"{}\"]", self.name()),
            _ => format!("html > head > meta[name=\"{}\"]", self.name()),
        }
    }
}

/// Named accessors for the live page.
///
/// Setters fail with [`Error::MissingAnchor`] when the page lacks the anchor.
pub trait PageSurface: Send {
    /// Fail with the first anchor the page lacks, without writing anything.
    fn check_anchors(&self) -> Result<(), Error>;

    /// Inner markup of the content region.
    fn content_html(&self) -> Result<String, Error>;

    fn set_content_html(&mut self, html: &str) -> Result<(), Error>;

    /// Replace the serialized JSON-LD in the structured-data slot.
    fn set_structured_data(&mut self, json: &str) -> Result<(), Error>;

    fn set_document_title(&mut self, title: &str) -> Result<(), Error>;

    /// Set the visible heading's text.
    fn set_heading(&mut self, text: &str) -> Result<(), Error>;

    fn set_canonical(&mut self, href: &str) -> Result<(), Error>;

    fn set_meta(&mut self, tag: MetaTag, content: &str) -> Result<(), Error>;

    fn set_copyright(&mut self, text: &str) -> Result<(), Error>;

    /// Toggle the `offline` presentation class on the document root.
    fn set_offline(&mut self, offline: bool);

    /// Current location as an absolute URL.
    fn location(&self) -> String;

    /// Push a history entry and move the location to `url`.
    fn push_history(&mut self, url: &str, title: &str);
}
