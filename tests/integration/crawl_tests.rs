//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the orchestrator
//! end-to-end with the HTTP-only backends. Browser backends are replaced by in-process
//! test backends where a pass needs controlled behavior.

use async_trait::async_trait;
use sitetrawl::config::Config;
use sitetrawl::crawler::backends::{ArchiveBackend, LightweightBackend, StaticMarkupBackend};
use sitetrawl::crawler::{
    BackendError, FetchBackend, FetchContext, Orchestrator, RunOutcome, MAX_CRAWL_DEPTH,
};
use sitetrawl::output::{write_output, OutputFormat};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// HTML response with the right Content-Type
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

fn orchestrator(config: Config, backends: Vec<Arc<dyn FetchBackend>>) -> Orchestrator {
    Orchestrator::with_backends(config, backends)
        .expect("Failed to build orchestrator")
        .echo_discoveries(false)
}

fn root(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("Failed to parse mock URI")
}

fn recorded(orch: &Orchestrator) -> Vec<String> {
    let mut urls: Vec<String> = orch
        .aggregator()
        .snapshot()
        .into_iter()
        .map(|r| r.url)
        .collect();
    urls.sort();
    urls
}

/// Mounts a small site: / -> page1, page2, off-site; page1 -> page2, logo.png
async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body>
            <a href="/page1">Page 1</a>
            <a href="/page2#top">Page 2</a>
            <a href="http://other.invalid/x">Elsewhere</a>
            <a href="mailto:admin@example.com">Mail</a>
            </body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<html><body><a href="/page2">Page 2</a><a href="/logo.png">Logo</a></body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("<html><body>Leaf</body></html>"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_static_backend_traverses_site() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "image/png"))
        .mount(&server)
        .await;

    let base = server.uri();
    let mut orch = orchestrator(Config::default(), vec![Arc::new(StaticMarkupBackend)]);
    orch.run(vec![root(&server)]).await.unwrap();

    assert_eq!(
        recorded(&orch),
        vec![
            format!("{}/", base),
            format!("{}/logo.png", base),
            format!("{}/page1", base),
            format!("{}/page2", base),
        ]
    );
    assert_eq!(orch.statistics().reported_errors, 0);
}

#[tokio::test]
async fn test_excluded_extensions_never_fetched() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.crawler.exclude_extensions = vec!["png".to_string(), "jpg".to_string()];
    let backends: Vec<Arc<dyn FetchBackend>> =
        vec![Arc::new(StaticMarkupBackend), Arc::new(LightweightBackend)];
    let mut orch = orchestrator(config, backends);
    orch.run(vec![root(&server)]).await.unwrap();

    let urls = recorded(&orch);
    assert!(!urls.iter().any(|u| u.ends_with("logo.png")));
    assert!(urls.contains(&format!("{}/page1", server.uri())));
    assert!(orch.statistics().excluded_extension >= 1);
}

#[tokio::test]
async fn test_out_of_scope_target_not_contacted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.crawler.scope = Some("*.example.com".to_string());
    let mut orch = orchestrator(config, vec![Arc::new(StaticMarkupBackend)]);
    orch.run(vec![root(&server)]).await.unwrap();

    assert!(orch.aggregator().is_empty());
    assert_eq!(orch.statistics().targets_skipped, 1);
}

#[tokio::test]
async fn test_lightweight_records_reachable_links_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body><a href="/ok">OK</a><a href="/missing">Missing</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut orch = orchestrator(Config::default(), vec![Arc::new(LightweightBackend)]);
    orch.run(vec![root(&server)]).await.unwrap();

    let base = server.uri();
    assert_eq!(recorded(&orch), vec![format!("{}/", base), format!("{}/ok", base)]);
    assert_eq!(orch.statistics().reported_errors, 1);
}

#[tokio::test]
async fn test_redirect_off_site_not_recorded() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    let landing = format!("http://localhost:{}/landing", elsewhere.address().port());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", landing.as_str()))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html(r#"<html><body><a href="/inner">Inner</a></body></html>"#))
        .mount(&elsewhere)
        .await;
    Mock::given(method("GET"))
        .and(path("/inner"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&elsewhere)
        .await;

    let backends: Vec<Arc<dyn FetchBackend>> =
        vec![Arc::new(StaticMarkupBackend), Arc::new(LightweightBackend)];
    let mut orch = orchestrator(Config::default(), backends);
    orch.run(vec![root(&site)]).await.unwrap();

    // Only the root itself; the landing page lives on another host
    assert_eq!(recorded(&orch), vec![format!("{}/", site.uri())]);
}

#[tokio::test]
async fn test_archive_backend_reads_index() {
    let archive = MockServer::start().await;
    let target = Url::parse("http://example.com/").unwrap();

    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .and(query_param("url", "http://example.com/*"))
        .and(query_param("output", "text"))
        .and(query_param("fl", "original"))
        .and(query_param("collapse", "urlkey"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "http://example.com/\nhttp://example.com/old-page\nhttps://example.com/legacy?id=1\n\nnot-a-url\n",
        ))
        .expect(1)
        .mount(&archive)
        .await;

    let mut config = Config::default();
    config.crawler.archive_endpoint = archive.uri();
    let mut orch = orchestrator(config, vec![Arc::new(ArchiveBackend)]);
    orch.run(vec![target]).await.unwrap();

    assert_eq!(
        recorded(&orch),
        vec![
            "http://example.com/".to_string(),
            "http://example.com/old-page".to_string(),
            "https://example.com/legacy?id=1".to_string(),
        ]
    );
    assert_eq!(orch.statistics().duplicates, 1);
}

#[tokio::test]
async fn test_archive_failure_is_reported_not_fatal() {
    let archive = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&archive)
        .await;

    let mut config = Config::default();
    config.crawler.archive_endpoint = archive.uri();
    let mut orch = orchestrator(config, vec![Arc::new(ArchiveBackend)]);
    orch.run(vec![Url::parse("http://example.com/").unwrap()])
        .await
        .unwrap();

    assert_eq!(recorded(&orch), vec!["http://example.com/".to_string()]);
    assert_eq!(orch.statistics().reported_errors, 1);
}

#[tokio::test]
async fn test_overlapping_backends_record_each_url_once() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "image/png"))
        .mount(&server)
        .await;

    let backends: Vec<Arc<dyn FetchBackend>> =
        vec![Arc::new(StaticMarkupBackend), Arc::new(LightweightBackend)];
    let mut orch = orchestrator(Config::default(), backends);
    orch.run(vec![root(&server)]).await.unwrap();

    let records = orch.aggregator().snapshot();
    let unique: HashSet<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(records.len(), 4);
    assert_eq!(unique.len(), 4);
    assert!(orch.statistics().duplicates > 0);
}

#[tokio::test]
async fn test_page_cap_limits_static_traversal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a><a href="/4">4</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(html("<html></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.crawler.max_pages = 2;
    config.crawler.concurrency = 1;
    let mut orch = orchestrator(config, vec![Arc::new(StaticMarkupBackend)]);
    orch.run(vec![root(&server)]).await.unwrap();

    // Links are still emitted even when the cap stops them being visited
    assert_eq!(orch.aggregator().len(), 5);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_unreachable_proxy_is_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = Config::default();
    // Nothing listens on the discard port
    config.proxy.source = Some("http://127.0.0.1:9".to_string());
    config.crawler.request_timeout_secs = 5;
    let mut orch = orchestrator(config, vec![Arc::new(StaticMarkupBackend)]);
    orch.run(vec![root(&server)]).await.unwrap();

    let stats = orch.statistics();
    assert_eq!(stats.suppressed_errors + stats.reported_errors, 1);
    assert_eq!(recorded(&orch), vec![format!("{}/", server.uri())]);
}

/// Emits two URLs never seen before on every pass
struct FanOutBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl FetchBackend for FanOutBackend {
    fn name(&self) -> &'static str {
        "fan-out"
    }

    async fn discover(&self, target: &Url, ctx: &FetchContext) -> Result<(), BackendError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        for suffix in ["a", "b"] {
            ctx.emit("fan-out", target.join(&format!("/p{}{}", n, suffix)).unwrap());
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_iterative_mode_stops_at_depth_ceiling() {
    let backend = Arc::new(FanOutBackend {
        calls: AtomicUsize::new(0),
    });
    let mut config = Config::default();
    config.crawler.iterative = true;
    let mut orch = orchestrator(config, vec![backend.clone()]);

    let reports = orch
        .crawl_target(&Url::parse("http://example.com/").unwrap())
        .await
        .unwrap();

    // 1 root pass, 2 passes at depth 2, 4 at depth 3
    assert_eq!(reports.len(), 7);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 7);
    assert!(reports.iter().all(|r| r.depth <= MAX_CRAWL_DEPTH));
    assert!(reports
        .iter()
        .filter(|r| r.depth == MAX_CRAWL_DEPTH)
        .all(|r| r.recurse.is_empty()));
    assert_eq!(orch.statistics().max_depth_reached, MAX_CRAWL_DEPTH);
    assert_eq!(orch.aggregator().len(), 15);
}

/// Never finishes within a test's lifetime
struct StallingBackend;

#[async_trait]
impl FetchBackend for StallingBackend {
    fn name(&self) -> &'static str {
        "stalling"
    }

    async fn discover(&self, target: &Url, ctx: &FetchContext) -> Result<(), BackendError> {
        ctx.emit("stalling", target.join("/early").unwrap());
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

#[tokio::test]
async fn test_timeout_keeps_partial_results() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("urls.json");

    let mut config = Config::default();
    config.crawler.timeout_secs = Some(1);
    let mut orch = orchestrator(config, vec![Arc::new(StallingBackend)]);
    let aggregator = orch.aggregator();

    let started = Instant::now();
    let outcome = orch
        .run_with_deadline(vec![Url::parse("http://example.com/").unwrap()])
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(5));

    let format = write_output(&output, false, &aggregator.snapshot()).unwrap();
    assert_eq!(format, OutputFormat::Json);

    let written: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let urls: Vec<&str> = written.iter().filter_map(|r| r["url"].as_str()).collect();
    assert!(urls.contains(&"http://example.com/"));
    assert!(urls.contains(&"http://example.com/early"));
}

#[tokio::test]
async fn test_text_output_sorted_and_unique() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "image/png"))
        .mount(&server)
        .await;

    let backends: Vec<Arc<dyn FetchBackend>> =
        vec![Arc::new(StaticMarkupBackend), Arc::new(LightweightBackend)];
    let mut orch = orchestrator(Config::default(), backends);
    orch.run(vec![root(&server)]).await.unwrap();

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("urls.txt");
    write_output(&output, false, &orch.aggregator().snapshot()).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    let mut sorted = lines.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(lines, sorted);
    assert_eq!(lines.len(), 4);
}
