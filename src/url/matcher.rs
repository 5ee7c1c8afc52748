use crate::ConfigError;
use regex::Regex;

/// Compiled hostname scope pattern
///
/// A pattern may contain `*` wildcards, which match any character sequence. The
/// compiled expression is anchored to the whole hostname. Additionally, a pattern
/// starting with `*.` also accepts the bare base domain, so `*.example.com` matches
/// both `www.example.com` and `example.com`.
///
/// # Examples
///
/// ```
/// use sitetrawl::url::ScopeMatcher;
///
/// let scope = ScopeMatcher::compile("*.example.com").unwrap();
/// assert!(scope.matches("example.com"));
/// assert!(scope.matches("blog.example.com"));
/// assert!(scope.matches("api.v2.example.com"));
/// assert!(!scope.matches("example.org"));
/// ```
#[derive(Debug, Clone)]
pub struct ScopeMatcher {
    pattern: String,
    regex: Regex,
    bare: String,
}

impl ScopeMatcher {
    /// Compiles a scope pattern into a matcher
    ///
    /// Literal characters (dots in particular) are escaped, each `*` becomes `.*`,
    /// and the result is anchored with `^...$`.
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = pattern.trim().to_lowercase();

        let expression = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = Regex::new(&format!("^{}$", expression))
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;

        let bare = pattern
            .strip_prefix("*.")
            .unwrap_or(&pattern)
            .to_string();

        Ok(Self {
            pattern,
            regex,
            bare,
        })
    }

    /// Returns true if the hostname falls within this scope
    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.regex.is_match(&host) || host == self.bare
    }

    /// The normalized pattern this matcher was compiled from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
