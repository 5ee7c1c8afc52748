use crate::UrlError;
use url::Url;

/// Scheme applied to targets supplied without one
const DEFAULT_SCHEME: &str = "http://";

/// Normalizes a root target supplied by the operator
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Prefix `http://` when no scheme is present
/// 3. Parse the URL; reject if malformed
/// 4. Reject schemes other than HTTP and HTTPS
/// 5. Reject URLs without a host
/// 6. Remove the fragment
///
/// # Examples
///
/// ```
/// use sitetrawl::url::normalize_target;
///
/// let url = normalize_target("example.com").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/");
///
/// let url = normalize_target("https://Example.com/docs#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn normalize_target(raw: &str) -> Result<Url, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let with_scheme = if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, raw)
    };

    let url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
    validate_web_url(url)
}

/// Normalizes a URL discovered during a crawl
///
/// Unlike [`normalize_target`] no scheme is added: candidates must already be absolute.
/// Returns None for anything that is not an absolute HTTP(S) URL with a host, since
/// malformed discoveries are skipped silently.
pub fn normalize_discovered(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    validate_web_url(url).ok()
}

/// Checks the scheme and host of a parsed URL and strips its fragment
fn validate_web_url(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingDomain),
    }

    url.set_fragment(None);
    Ok(url)
}

/// Returns true if the string already carries an explicit `scheme://` prefix
fn has_scheme(raw: &str) -> bool {
    match raw.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}
