//! Egress proxy rotation
//!
//! A proxy pool is loaded once per run from a single URI or from a file with one URI per
//! line. Every fetch attempt picks a proxy independently and uniformly at random, so the
//! same proxy may be picked repeatedly. An empty pool means fetches go out directly.

use crate::ProxyError;
use rand::seq::IndexedRandom;
use std::fmt;
use std::path::Path;
use url::Url;

/// Transport kind, derived from the proxy URI scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    /// `http://` or `https://` forward proxy
    Http,
    /// `socks4://` or `socks4a://`
    Socks4,
    /// `socks5://` or `socks5h://`
    Socks5,
}

impl ProxyKind {
    /// Maps a URI scheme to a transport kind
    pub fn from_scheme(scheme: &str) -> Result<Self, ProxyError> {
        match scheme.to_ascii_lowercase().as_str() {
            "http" | "https" => Ok(Self::Http),
            "socks4" | "socks4a" => Ok(Self::Socks4),
            "socks5" | "socks5h" => Ok(Self::Socks5),
            other => Err(ProxyError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Returns true for SOCKS transports
    pub fn is_socks(&self) -> bool {
        matches!(self, Self::Socks4 | Self::Socks5)
    }
}

/// Credentials injected into every selected proxy
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

impl ProxyAuth {
    /// Parses `username:password`; the password may itself contain colons
    pub fn parse(raw: &str) -> Result<Self, ProxyError> {
        match raw.split_once(':') {
            Some((username, password)) if !username.is_empty() => Ok(Self {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err(ProxyError::InvalidAuth),
        }
    }
}

impl fmt::Debug for ProxyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One parsed proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    url: Url,
    kind: ProxyKind,
}

impl ProxyEndpoint {
    /// Parses and checks a proxy URI
    ///
    /// Fails for malformed URIs, URIs without a host, and unsupported schemes.
    pub fn parse(raw: &str) -> Result<Self, ProxyError> {
        let raw = raw.trim();
        let url = Url::parse(raw).map_err(|e| ProxyError::InvalidUri {
            uri: raw.to_string(),
            reason: e.to_string(),
        })?;

        let kind = ProxyKind::from_scheme(url.scheme())?;

        if url.host_str().map_or(true, str::is_empty) {
            return Err(ProxyError::InvalidUri {
                uri: raw.to_string(),
                reason: "missing host".to_string(),
            });
        }

        Ok(Self { url, kind })
    }

    /// The proxy URI as configured
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Transport kind
    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    /// The proxy URI with credentials embedded in its userinfo
    pub fn with_credentials(&self, auth: Option<&ProxyAuth>) -> Url {
        let mut url = self.url.clone();
        if let Some(auth) = auth {
            // Hosts were validated at parse time, so setting userinfo cannot fail
            let _ = url.set_username(&auth.username);
            let _ = url.set_password(Some(&auth.password));
        }
        url
    }

    /// Builds a reqwest proxy handle for this endpoint
    ///
    /// HTTP proxies get a `Proxy-Authorization` header; SOCKS proxies carry the
    /// credentials in the URI userinfo.
    pub fn to_reqwest(&self, auth: Option<&ProxyAuth>) -> Result<reqwest::Proxy, ProxyError> {
        let proxy = match self.kind {
            ProxyKind::Http => {
                let proxy = reqwest::Proxy::all(self.url.as_str())?;
                match auth {
                    Some(auth) => proxy.basic_auth(&auth.username, &auth.password),
                    None => proxy,
                }
            }
            ProxyKind::Socks4 | ProxyKind::Socks5 => {
                reqwest::Proxy::all(self.with_credentials(auth).as_str())?
            }
        };
        Ok(proxy)
    }

    /// Value for Chromium's `--proxy-server` switch (no credentials; Chromium rejects them)
    pub fn browser_server(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{}://{}:{}", self.url.scheme(), host, port),
            None => format!("{}://{}", self.url.scheme(), host),
        }
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.browser_server())
    }
}

/// Ordered pool of proxy endpoints
#[derive(Debug, Clone, Default)]
pub struct ProxyPool {
    endpoints: Vec<ProxyEndpoint>,
    auth: Option<ProxyAuth>,
}

impl ProxyPool {
    /// A pool with no proxies: every fetch goes out directly
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a pool from already-parsed endpoints
    pub fn new(endpoints: Vec<ProxyEndpoint>, auth: Option<ProxyAuth>) -> Self {
        Self { endpoints, auth }
    }

    /// Loads a pool from the configured source
    ///
    /// A source containing `://` is treated as a single proxy URI; anything else is a
    /// path to a file with one URI per line. Blank lines and `#` comments are skipped.
    pub fn load(source: Option<&str>, auth: Option<&str>) -> Result<Self, ProxyError> {
        let auth = auth.map(ProxyAuth::parse).transpose()?;

        let endpoints = match source.map(str::trim) {
            None | Some("") => Vec::new(),
            Some(uri) if uri.contains("://") => vec![ProxyEndpoint::parse(uri)?],
            Some(path) => Self::read_file(Path::new(path))?,
        };

        Ok(Self { endpoints, auth })
    }

    fn read_file(path: &Path) -> Result<Vec<ProxyEndpoint>, ProxyError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProxyError::File {
            path: path.display().to_string(),
            source,
        })?;

        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(ProxyEndpoint::parse)
            .collect()
    }

    /// Picks a proxy uniformly at random, with replacement
    pub fn pick(&self) -> Option<&ProxyEndpoint> {
        self.endpoints.choose(&mut rand::rng())
    }

    /// Credentials applied to every selected proxy
    pub fn auth(&self) -> Option<&ProxyAuth> {
        self.auth.as_ref()
    }

    /// Number of proxies in the pool
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true if no proxy is configured
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
