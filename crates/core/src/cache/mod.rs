//! SQLite-backed named cache stores.
//!
//! This module provides a persistent request/response cache using SQLite
//! with async access via tokio-rusqlite. Entries live in named stores
//! (`offline-v<N>`) and are keyed by request method and URL:
//!
//! - Schema versioned through `user_version`
//! - WAL mode for concurrent access
//! - Lookup in one store or across every store
//!
//! Stores grow without bound. Nothing here evicts entries or removes stores
//! orphaned by a version bump.

pub mod connection;
pub mod hash;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use store::CachedResponse;
