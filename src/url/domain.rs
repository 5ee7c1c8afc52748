use url::Url;

/// Extracts the lowercase host of a URL
///
/// Returns None if the URL has no host (which shouldn't happen for the HTTP(S) URLs
/// the crawler works with).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitetrawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs point at the same host, ignoring scheme and port
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Returns true if both URLs share scheme, host and port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_extract_subdomain() {
        assert_eq!(
            extract_domain(&url("https://blog.example.com/post")),
            Some("blog.example.com".to_string())
        );
    }

    #[test]
    fn test_extract_ip_address() {
        assert_eq!(
            extract_domain(&url("http://127.0.0.1:3000/")),
            Some("127.0.0.1".to_string())
        );
    }

    #[test]
    fn test_same_host_ignores_scheme_and_port() {
        assert!(same_host(
            &url("http://example.com/a"),
            &url("https://example.com:8443/b")
        ));
        assert!(!same_host(
            &url("http://example.com/a"),
            &url("http://www.example.com/a")
        ));
    }

    #[test]
    fn test_same_origin_checks_port() {
        assert!(same_origin(
            &url("http://example.com/a"),
            &url("http://example.com:80/b")
        ));
        assert!(!same_origin(
            &url("http://example.com/a"),
            &url("http://example.com:8080/a")
        ));
        assert!(!same_origin(
            &url("http://example.com/a"),
            &url("https://example.com/a")
        ));
    }
}
