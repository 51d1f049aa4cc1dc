//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting the offline response stores.

pub mod get;

pub use get::{CacheGetOutput, CacheGetParams, get_impl};
