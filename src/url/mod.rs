//! URL handling module for Sitetrawl
//!
//! This module provides target normalization, domain extraction, scope matching,
//! extension filtering, and the combined acceptance policy applied to every URL.

mod domain;
mod extension;
mod matcher;
mod normalize;

use crate::config::CrawlerConfig;
use crate::ConfigError;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_host, same_origin};
pub use extension::{extension_of, normalize_extension, ExtensionFilter};
pub use matcher::ScopeMatcher;
pub use normalize::{normalize_discovered, normalize_target};

/// Outcome of evaluating a URL against the crawl policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyDecision {
    /// URL is in scope and not excluded
    Accepted,
    /// Host does not match the scope pattern
    OutOfScope,
    /// Final path segment carries an excluded extension
    ExcludedExtension,
}

impl PolicyDecision {
    /// Returns true if the URL may be recorded and fetched
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Scope and extension policy, compiled once per run
///
/// # Examples
///
/// ```
/// use sitetrawl::url::{normalize_target, PolicyDecision, UrlPolicy};
///
/// let policy = UrlPolicy::new(Some("*.example.com"), ["png", "jpg"]).unwrap();
///
/// let page = normalize_target("http://sub.example.com/index.html").unwrap();
/// assert_eq!(policy.evaluate(&page), PolicyDecision::Accepted);
///
/// let logo = normalize_target("http://sub.example.com/logo.png").unwrap();
/// assert_eq!(policy.evaluate(&logo), PolicyDecision::ExcludedExtension);
///
/// let other = normalize_target("http://other.com/a").unwrap();
/// assert_eq!(policy.evaluate(&other), PolicyDecision::OutOfScope);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UrlPolicy {
    scope: Option<ScopeMatcher>,
    extensions: ExtensionFilter,
}

impl UrlPolicy {
    /// Compiles a policy from an optional scope pattern and excluded extensions
    pub fn new<I, S>(scope: Option<&str>, excluded_extensions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scope = match scope {
            Some(pattern) if !pattern.trim().is_empty() => Some(ScopeMatcher::compile(pattern)?),
            _ => None,
        };

        Ok(Self {
            scope,
            extensions: ExtensionFilter::new(excluded_extensions),
        })
    }

    /// Compiles the policy described by the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, ConfigError> {
        Self::new(config.scope.as_deref(), &config.exclude_extensions)
    }

    /// Returns true if the URL's host is within scope (always true without a scope)
    pub fn in_scope(&self, url: &Url) -> bool {
        match &self.scope {
            None => true,
            Some(matcher) => url.host_str().is_some_and(|host| matcher.matches(host)),
        }
    }

    /// Returns true if the URL's extension is excluded
    pub fn is_excluded(&self, url: &Url) -> bool {
        self.extensions.is_excluded(url)
    }

    /// Evaluates scope first, then the extension filter
    pub fn evaluate(&self, url: &Url) -> PolicyDecision {
        if !self.in_scope(url) {
            PolicyDecision::OutOfScope
        } else if self.is_excluded(url) {
            PolicyDecision::ExcludedExtension
        } else {
            PolicyDecision::Accepted
        }
    }

    /// Convenience wrapper for [`UrlPolicy::evaluate`]
    pub fn accepts(&self, url: &Url) -> bool {
        self.evaluate(url).is_accepted()
    }

    /// The scope pattern, if any
    pub fn scope_pattern(&self) -> Option<&str> {
        self.scope.as_ref().map(|s| s.pattern())
    }
}
