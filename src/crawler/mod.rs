//! Crawler module for multi-strategy URL discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with per-attempt proxy selection
//! - HTML parsing and link extraction
//! - The fetch backends and their shared context
//! - The per-pass discovery owner
//! - Error classification
//! - Overall orchestration of passes, iterative re-crawls and the deadline

pub mod backends;
mod classify;
mod discovery;
mod fetcher;
mod orchestrator;
mod parser;

pub use backends::{BackendError, FetchBackend, FetchContext, FetchStrategy};
pub use classify::{error_chain, should_suppress};
pub use discovery::{
    DiscoveryEvent, DiscoveryOwner, DiscoverySet, DiscoverySink, PassDiscoveries,
};
pub use fetcher::{
    build_http_client, fetch_page, fetch_url, FetchConfig, FetchResult, FetchedPage, HttpClients,
};
pub use orchestrator::{Orchestrator, PassReport, RunOutcome, MAX_CRAWL_DEPTH};
pub use parser::{extract_links, extract_resource_links};
