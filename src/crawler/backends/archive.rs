//! Historical-archive fetcher
//!
//! Asks a CDX snapshot index for every original URL it has captured under the target.
//! The target itself is never contacted.

use super::{BackendError, FetchBackend, FetchContext};
use crate::crawler::classify::error_chain;
use async_trait::async_trait;
use url::Url;

const NAME: &str = "archive";

/// Path of the CDX query endpoint under the archive base URL
const CDX_PATH: &str = "/cdx/search/cdx";

/// Snapshot index backend
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveBackend;

/// Builds the index query for a target
///
/// # Example
///
/// ```
/// use sitetrawl::crawler::backends::build_query_url;
/// use url::Url;
///
/// let target = Url::parse("http://example.com/").unwrap();
/// let query = build_query_url("https://web.archive.org", &target).unwrap();
/// let pairs: Vec<(String, String)> = query.query_pairs().into_owned().collect();
/// assert_eq!(pairs[0], ("url".to_string(), "http://example.com/*".to_string()));
/// ```
pub fn build_query_url(endpoint: &str, target: &Url) -> Result<Url, BackendError> {
    let base = format!("{}{}", endpoint.trim_end_matches('/'), CDX_PATH);
    let mut query = Url::parse(&base)
        .map_err(|e| BackendError::Archive(format!("invalid endpoint {}: {}", endpoint, e)))?;

    let pattern = format!("{}/*", target.as_str().trim_end_matches('/'));
    query
        .query_pairs_mut()
        .append_pair("url", &pattern)
        .append_pair("output", "text")
        .append_pair("fl", "original")
        .append_pair("collapse", "urlkey");

    Ok(query)
}

/// Keeps the lines of an index response that look like URLs
pub fn parse_index_lines(body: &str) -> Vec<&str> {
    body.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("http"))
        .collect()
}

#[async_trait]
impl FetchBackend for ArchiveBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn discover(&self, target: &Url, ctx: &FetchContext) -> Result<(), BackendError> {
        let query = build_query_url(&ctx.config().archive_endpoint, target)?;
        let client = ctx.clients.for_attempt()?;

        let http_error = |e: reqwest::Error| BackendError::Http {
            url: query.to_string(),
            message: error_chain(&e),
        };

        let response = client.get(query.clone()).send().await.map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Archive(format!(
                "HTTP {} from {}",
                status.as_u16(),
                query
            )));
        }

        let body = response.text().await.map_err(http_error)?;
        let lines = parse_index_lines(&body);
        tracing::debug!("[{}] {} captures for {}", NAME, lines.len(), target);

        for line in lines {
            ctx.sink.emit_raw(NAME, line);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parameters() {
        let target = Url::parse("https://example.com/docs/").unwrap();
        let query = build_query_url("https://web.archive.org/", &target).unwrap();

        assert_eq!(query.path(), "/cdx/search/cdx");
        let pairs: Vec<(String, String)> = query.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("url".to_string(), "https://example.com/docs/*".to_string()),
                ("output".to_string(), "text".to_string()),
                ("fl".to_string(), "original".to_string()),
                ("collapse".to_string(), "urlkey".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let target = Url::parse("http://example.com/").unwrap();
        assert!(matches!(
            build_query_url("not a url", &target),
            Err(BackendError::Archive(_))
        ));
    }

    #[test]
    fn test_index_lines_filtered() {
        let body = "http://example.com/\nhttps://example.com/about\n\nwarning: partial\n  http://example.com/x  \n";
        assert_eq!(
            parse_index_lines(body),
            vec![
                "http://example.com/",
                "https://example.com/about",
                "http://example.com/x"
            ]
        );
    }
}
