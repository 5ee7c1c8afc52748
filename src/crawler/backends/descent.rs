//! Manual descent
//!
//! A second browser pass that treats every `href` and `src` on a page as a lead. Each
//! URL on the target's host not seen before is emitted; it is also visited unless its
//! path is the site root or ends in `/`. Links are resolved against the page the browser
//! landed on but always compared with the target, so a redirect off-site ends that branch.
//! Visits are driven by an explicit worklist, so depth is bounded only by the site and
//! the global timeout.

use super::browser::{browser_error, BrowserSession, PageLoader};
use super::{BackendError, FetchBackend, FetchContext};
use crate::crawler::parser::extract_resource_links;
use crate::url::same_host;
use async_trait::async_trait;
use std::collections::HashSet;
use url::Url;

const NAME: &str = "descent";

/// Worklist-driven descent over rendered pages
#[derive(Debug, Clone, Copy, Default)]
pub struct DescentBackend;

/// Returns true if the descent should visit a discovered URL
///
/// Directory-like paths are emitted but not visited.
///
/// # Examples
///
/// ```
/// use sitetrawl::crawler::backends::should_descend;
/// use url::Url;
///
/// assert!(should_descend(&Url::parse("http://example.com/about").unwrap()));
/// assert!(!should_descend(&Url::parse("http://example.com/").unwrap()));
/// assert!(!should_descend(&Url::parse("http://example.com/blog/").unwrap()));
/// ```
pub fn should_descend(url: &Url) -> bool {
    let path = url.path();
    path != "/" && !path.ends_with('/')
}

#[async_trait]
impl FetchBackend for DescentBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn discover(&self, target: &Url, ctx: &FetchContext) -> Result<(), BackendError> {
        let session = BrowserSession::launch(ctx.config())
            .await
            .map_err(browser_error)?;

        let result = descend(&session, target, ctx).await;
        session.close().await;
        result
    }
}

async fn descend<L: PageLoader>(
    loader: &L,
    target: &Url,
    ctx: &FetchContext,
) -> Result<(), BackendError> {
    let mut worklist = vec![target.clone()];
    let mut visited = HashSet::from([target.to_string()]);

    while let Some(url) = worklist.pop() {
        let page = match loader.visit(&url).await {
            Ok(page) => page,
            Err(e) if url == *target => return Err(browser_error(e)),
            Err(e) => {
                ctx.report_failure(NAME, &browser_error(e));
                continue;
            }
        };

        let mut next = Vec::new();
        for link in extract_resource_links(&page.html, &page.final_url) {
            if !same_host(&link, target) || !visited.insert(link.to_string()) {
                continue;
            }

            ctx.emit(NAME, link.clone());
            if should_descend(&link) {
                next.push(link);
            }
        }

        // Reverse so pages are visited in document order
        worklist.extend(next.into_iter().rev());
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

    fn site() -> CannedPages {
        CannedPages::default()
            .page(
                "http://example.com/",
                r#"<a href="/a">a</a>
                   <a href="/docs/">docs</a>
                   <a href="/r">sign in</a>
                   <a href="http://other.com/x">elsewhere</a>"#,
            )
            .page(
                "http://example.com/a",
                r#"<a href="/">home</a><a href="/a">self</a><a href="/b">b</a>"#,
            )
            .page(
                "http://example.com/b",
                r#"<a href="/a">back</a><img src="/gone">"#,
            )
            .redirect(
                "http://example.com/r",
                "http://other.test/p",
                r#"<a href="/q">q</a><a href="http://other.test/s">s</a>"#,
            )
    }

    #[test]
    fn test_should_descend() {
        assert!(should_descend(&url("http://example.com/page.html")));
        assert!(should_descend(&url("http://example.com/a/b")));
        assert!(!should_descend(&url("http://example.com")));
        assert!(!should_descend(&url("http://example.com/docs/")));
    }

    #[tokio::test]
    async fn test_descent_worklist() {
        let pages = site();
        let (ctx, owner) = context(None);
        let target = url("http://example.com/");

        descend(&pages, &target, &ctx).await.unwrap();
        drop(ctx);
        let outcome = owner.finish().await;

        // Depth first, each page once, directories emitted but never opened
        assert_eq!(
            pages.visits(),
            vec![
                "http://example.com/",
                "http://example.com/a",
                "http://example.com/b",
                "http://example.com/gone",
                "http://example.com/r",
            ]
        );

        let mut accepted: Vec<String> = outcome.accepted.iter().map(Url::to_string).collect();
        accepted.sort();
        assert_eq!(
            accepted,
            vec![
                "http://example.com/a",
                "http://example.com/b",
                "http://example.com/docs/",
                "http://example.com/gone",
                "http://example.com/r",
            ]
        );
        assert_eq!(outcome.duplicates, 0);
        assert_eq!(outcome.reported_errors, 1);
    }

    #[tokio::test]
    async fn test_descent_stops_at_off_site_redirect() {
        let pages = site();
        let (ctx, owner) = context(None);

        descend(&pages, &url("http://example.com/"), &ctx)
            .await
            .unwrap();
        drop(ctx);
        let outcome = owner.finish().await;

        assert!(pages.visits().iter().all(|v| !v.contains("other.")));
        assert!(outcome
            .accepted
            .iter()
            .all(|u| u.host_str() == Some("example.com")));
    }

    #[tokio::test]
    async fn test_descent_root_failure_is_returned() {
        let pages = CannedPages::default();
        let (ctx, owner) = context(None);

        let result = descend(&pages, &url("http://example.com/"), &ctx).await;
        assert!(matches!(result, Err(BackendError::Browser(_))));

        drop(ctx);
        let outcome = owner.finish().await;
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.reported_errors, 0);
    }
}
