use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// One accepted URL plus derived metadata
///
/// Created exactly once, when a candidate passes policy and deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryRecord {
    /// When the URL was accepted (serialized as RFC 3339 / ISO-8601)
    pub timestamp: DateTime<Utc>,

    /// The accepted URL
    pub url: String,

    /// URL path component
    pub path: String,

    /// Lowercase host
    pub host: String,

    /// Explicit port, or the scheme's default
    pub port: Option<u16>,
}

impl DiscoveryRecord {
    /// Builds a record stamped with the current time
    pub fn new(url: &Url) -> Self {
        Self::at(url, Utc::now())
    }

    /// Builds a record with an explicit timestamp
    pub fn at(url: &Url, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            url: url.to_string(),
            path: url.path().to_string(),
            host: url.host_str().unwrap_or_default().to_lowercase(),
            port: url.port_or_known_default(),
        }
    }
}
