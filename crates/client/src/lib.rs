//! Client side of pwa-offline.
//!
//! This crate provides the offline cache worker, the page content refresh
//! controller and the HTTP transport and HTML normalization they share.

pub mod controller;
pub mod extract;
pub mod fetch;
pub mod page;
pub mod schema;
pub mod worker;

#[cfg(test)]
mod testing;

pub use controller::{ContentRefreshController, LinkAction, LinkClick, RefreshConfig, RefreshOutcome, apply_envelope};
pub use extract::normalize_html;
pub use fetch::{CacheMode, FetchConfig, Fetcher, HttpFetcher, Request, RequestMode, Response};
pub use page::{MemoryPage, MetaTag, PageSurface};
pub use worker::{FetchDecision, FetchSource, OfflineWorker, Registration, WorkerConfig};
