//! Static-markup fetcher
//!
//! Breadth-first traversal over raw response bodies. Pages are fetched in waves of up to
//! `concurrency` parallel requests; link bookkeeping happens between waves so the visited
//! set needs no locking.

use super::{BackendError, FetchBackend, FetchContext};
use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::extract_links;
use crate::url::same_origin;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{HashSet, VecDeque};
use url::Url;

const NAME: &str = "static";

/// Parses markup without running scripts; the default primary fetcher
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMarkupBackend;

#[async_trait]
impl FetchBackend for StaticMarkupBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn discover(&self, target: &Url, ctx: &FetchContext) -> Result<(), BackendError> {
        let config = ctx.config();
        let concurrency = config.concurrency;
        let max_pages = config.max_pages;

        let mut queue = VecDeque::from([target.clone()]);
        let mut visited = HashSet::from([target.to_string()]);
        let mut pages = 0usize;

        while !queue.is_empty() && pages < max_pages {
            let take = queue.len().min(concurrency).min(max_pages - pages);
            let wave: Vec<Url> = queue.drain(..take).collect();
            pages += wave.len();

            let results: Vec<(Url, _)> = stream::iter(wave)
                .map(|url| async move {
                    let result = fetch_page(&ctx.clients, &url).await;
                    (url, result)
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

            for (url, result) in results {
                let page = match result {
                    Ok(page) => page,
                    // The root is the only page in the first wave
                    Err(e) if url == *target => return Err(e),
                    Err(e) => {
                        ctx.report_failure(NAME, &e);
                        continue;
                    }
                };

                ctx.emit_final(NAME, &page.final_url, target);

                let Some(body) = page.body else {
                    continue;
                };

                for link in extract_links(&body, &page.final_url) {
                    if !ctx.is_candidate(&link, target) {
                        continue;
                    }
                    ctx.emit(NAME, link.clone());

                    if same_origin(&link, target)
                        && ctx.policy.accepts(&link)
                        && visited.insert(link.to_string())
                    {
                        queue.push_back(link);
                    }
                }
            }
        }

        if !queue.is_empty() {
            tracing::debug!(
                "[{}] page cap of {} reached for {}, {} queued URLs left",
                NAME,
                max_pages,
                target,
                queue.len()
            );
        }

        Ok(())
    }
}
