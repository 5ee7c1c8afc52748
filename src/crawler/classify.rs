//! Error classification
//!
//! Several backends routinely fail on the same URL for reasons that say nothing about the
//! links reachable from it (a certificate issued for another name, a refused port, a slow
//! host). Those failures are suppressed; everything else is reported.

use std::error::Error;

/// Substrings identifying benign failures
const BENIGN_PATTERNS: &[&str] = &[
    // TLS hostname mismatch
    "NotValidForName",
    "certificate is not valid for",
    "ERR_CERT_COMMON_NAME_INVALID",
    "does not match certificate's altnames",
    // Connection refused
    "Connection refused",
    "connection refused",
    "ECONNREFUSED",
    "ERR_CONNECTION_REFUSED",
    // Timeouts
    "timed out",
    "Timeout",
    "ETIMEDOUT",
    "ERR_TIMED_OUT",
    "Navigation timeout",
    // Empty statistics notices
    "no statistics",
    "statistics are empty",
];

/// Returns true if the message describes expected network noise
///
/// # Examples
///
/// ```
/// use sitetrawl::crawler::should_suppress;
///
/// assert!(should_suppress("tcp connect error: Connection refused (os error 111)"));
/// assert!(should_suppress("operation timed out"));
/// assert!(!should_suppress("HTTP 500 for http://example.com/"));
/// ```
pub fn should_suppress(message: &str) -> bool {
    BENIGN_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
}

/// Renders an error and all of its sources as one `outer: inner: root` line
///
/// Transport errors usually keep the interesting part (refused, timed out) in a source,
/// so classification has to see the whole chain.
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
