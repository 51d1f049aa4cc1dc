//! Core types and shared functionality for pwa-offline.
//!
//! This crate provides:
//! - Named cache stores with SQLite backend
//! - Page content envelope types
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod page;

pub use cache::{CacheDb, CachedResponse};
pub use config::{AppConfig, ConfigError, RenderMode, UpdateMode};
pub use error::{Error, ExtractFailure};
pub use page::{PageContent, PageEnvelope};
