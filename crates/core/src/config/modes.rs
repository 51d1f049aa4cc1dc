//! Render and update modes fixed at page load.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Where page content is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Server delivers complete pages; links navigate normally.
    Server,
    /// Server delivers a shell; content is always fetched by the page.
    Client,
    /// Server renders content; the page fills in when the shell is empty.
    #[default]
    Hybrid,
}

/// How the page fetches replacement content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    Disabled,
    #[default]
    Json,
    Html,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Client => "client",
            Self::Hybrid => "hybrid",
        }
    }
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "client" => Ok(Self::Client),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(ConfigError::Invalid {
                field: "render_mode".into(),
                reason: format!("unknown mode '{other}' (expected server, client or hybrid)"),
            }),
        }
    }
}

impl FromStr for UpdateMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" => Ok(Self::Disabled),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => Err(ConfigError::Invalid {
                field: "update_mode".into(),
                reason: format!("unknown mode '{other}' (expected disabled, json or html)"),
            }),
        }
    }
}
