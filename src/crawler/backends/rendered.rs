//! Rendered-DOM fetcher
//!
//! Drives headless Chromium so links inserted by scripts are seen. Pages are visited one
//! at a time through a single tab, breadth-first, following same-origin links.

use super::browser::{browser_error, BrowserSession, PageLoader};
use super::{BackendError, FetchBackend, FetchContext};
use crate::crawler::parser::extract_links;
use crate::url::same_origin;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use url::Url;

const NAME: &str = "rendered";

/// Browser-rendering primary fetcher, used in recursive mode
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderedBackend;

#[async_trait]
impl FetchBackend for RenderedBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn discover(&self, target: &Url, ctx: &FetchContext) -> Result<(), BackendError> {
        let session = BrowserSession::launch(ctx.config())
            .await
            .map_err(browser_error)?;

        let result = traverse(&session, target, ctx).await;
        session.close().await;
        result
    }
}

async fn traverse<L: PageLoader>(
    loader: &L,
    target: &Url,
    ctx: &FetchContext,
) -> Result<(), BackendError> {
    let max_pages = ctx.config().max_pages;
    let mut queue = VecDeque::from([target.clone()]);
    let mut visited = HashSet::from([target.to_string()]);
    let mut pages = 0usize;

    while let Some(url) = queue.pop_front() {
        if pages >= max_pages {
            tracing::debug!("[{}] page cap of {} reached for {}", NAME, max_pages, target);
            break;
        }
        pages += 1;

        let page = match loader.visit(&url).await {
            Ok(page) => page,
            Err(e) if url == *target => return Err(browser_error(e)),
            Err(e) => {
                ctx.report_failure(NAME, &browser_error(e));
                continue;
            }
        };

        ctx.emit_final(NAME, &page.final_url, target);

        for link in extract_links(&page.html, &page.final_url) {
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

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::backends::browser::tests::CannedPages;
    use crate::crawler::backends::tests::context;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_traversal_ignores_off_site_landing() {
        let pages = CannedPages::default()
            .page(
                "http://example.com/",
                r#"<a href="/a">a</a><a href="/r">r</a>"#,
            )
            .page("http://example.com/a", r#"<a href="/">home</a>"#)
            .redirect(
                "http://example.com/r",
                "http://other.test/p",
                r#"<a href="http://other.test/q">q</a>"#,
            );
        let (ctx, owner) = context(None);

        traverse(&pages, &url("http://example.com/"), &ctx)
            .await
            .unwrap();
        drop(ctx);
        let outcome = owner.finish().await;

        assert_eq!(
            pages.visits(),
            vec![
                "http://example.com/",
                "http://example.com/a",
                "http://example.com/r",
            ]
        );
        assert_eq!(
            outcome.accepted,
            vec![
                url("http://example.com/"),
                url("http://example.com/a"),
                url("http://example.com/r"),
            ]
        );
        assert_eq!(outcome.duplicates, 2);
    }
}
