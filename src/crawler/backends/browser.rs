//! Headless Chromium session shared by the rendered fetcher and the manual descent

use super::BackendError;
use crate::crawler::fetcher::FetchConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use url::Url;

/// A loaded page, after scripts ran and navigation settled
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL the browser ended up on
    pub final_url: Url,
    /// Serialized DOM
    pub html: String,
}

/// Source of rendered pages for the browser traversals
#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Navigates to a URL and returns the rendered DOM
    async fn visit(&self, url: &Url) -> Result<RenderedPage>;
}

/// One browser process with one tab, reused for every visit of a traversal
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    timeout: std::time::Duration,
}

impl BrowserSession {
    /// Launches a browser with the proxy and TLS settings of this attempt
    pub async fn launch(config: &FetchConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(config.request_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", config.user_agent));

        if config.ignore_ssl {
            builder = builder.arg("--ignore-certificate-errors");
        }

        if let Some(endpoint) = config.proxies.pick() {
            if config.proxies.auth().is_some() {
                tracing::warn!(
                    "Proxy credentials are not passed to the browser; {} must accept unauthenticated connections",
                    endpoint
                );
            }
            builder = builder.arg(format!("--proxy-server={}", endpoint.browser_server()));
        }

        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(e).context("Failed to open a browser tab");
            }
        };

        Ok(Self {
            browser,
            page,
            handler,
            timeout: config.request_timeout,
        })
    }

    async fn load(&self, url: &Url) -> Result<RenderedPage> {
        self.page.goto(url.as_str()).await?;
        self.page.wait_for_navigation().await?;

        let html = self.page.content().await?;
        let final_url = self
            .page
            .url()
            .await?
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());

        Ok(RenderedPage { final_url, html })
    }

    /// Shuts the browser down
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser did not close cleanly: {}", e);
        }
        self.handler.abort();
    }
}

#[async_trait]
impl PageLoader for BrowserSession {
    async fn visit(&self, url: &Url) -> Result<RenderedPage> {
        tokio::time::timeout(self.timeout, self.load(url))
            .await
            .map_err(|_| anyhow::anyhow!("Navigation timeout of {:?} exceeded", self.timeout))?
            .with_context(|| format!("Failed to load {}", url))
    }
}

/// Keeps the whole context chain so the classifier sees the root cause
pub fn browser_error(error: anyhow::Error) -> BackendError {
    BackendError::Browser(format!("{:#}", error))
}
