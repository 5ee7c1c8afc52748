//! Lightweight HTTP fetcher
//!
//! Loads the target, extracts its links and loads each of them once. Only URLs that
//! actually answer are emitted, and only where they landed on the target's host.

use super::{BackendError, FetchBackend, FetchContext};
use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::extract_links;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use url::Url;

const NAME: &str = "lightweight";

/// Connections this backend keeps open at once, regardless of the concurrency setting
pub const MAX_IN_FLIGHT: usize = 10;

/// Target-plus-one-hop fetcher
#[derive(Debug, Clone, Copy, Default)]
pub struct LightweightBackend;

#[async_trait]
impl FetchBackend for LightweightBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn discover(&self, target: &Url, ctx: &FetchContext) -> Result<(), BackendError> {
        let page = fetch_page(&ctx.clients, target).await?;
        ctx.emit_final(NAME, &page.final_url, target);

        let Some(body) = page.body else {
            return Ok(());
        };

        let mut seen = HashSet::from([target.to_string(), page.final_url.to_string()]);
        let links: Vec<Url> = extract_links(&body, &page.final_url)
            .into_iter()
            .filter(|link| ctx.is_candidate(link, target) && ctx.policy.accepts(link))
            .filter(|link| seen.insert(link.to_string()))
            .collect();

        tracing::debug!("[{}] {} links to verify from {}", NAME, links.len(), target);

        stream::iter(links)
            .map(|link| async move { fetch_page(&ctx.clients, &link).await })
            .buffer_unordered(MAX_IN_FLIGHT)
            .for_each(|result| async move {
                match result {
                    Ok(page) => ctx.emit_final(NAME, &page.final_url, target),
                    Err(e) => ctx.report_failure(NAME, &e),
                }
            })
            .await;

        Ok(())
    }
}
