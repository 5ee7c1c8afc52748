use std::collections::HashSet;
use url::Url;

/// Set of file extensions whose URLs are skipped
///
/// Entries are stored lowercase without a leading dot. An empty filter excludes nothing.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    excluded: HashSet<String>,
}

impl ExtensionFilter {
    /// Builds a filter from raw entries such as `"PNG"`, `".jpg"` or `" gif "`
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded = entries
            .into_iter()
            .filter_map(|entry| normalize_extension(entry.as_ref()))
            .collect();

        Self { excluded }
    }

    /// Parses a comma-separated list, e.g. `"png,jpg,css"`
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Returns true if the URL's extension is in the exclusion set
    pub fn is_excluded(&self, url: &Url) -> bool {
        if self.excluded.is_empty() {
            return false;
        }

        match extension_of(url) {
            Some(ext) => self.excluded.contains(&ext),
            None => false,
        }
    }

    /// Returns true if nothing is excluded
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }

    /// Number of excluded extensions
    pub fn len(&self) -> usize {
        self.excluded.len()
    }
}

/// Lowercases an extension entry and strips surrounding whitespace and a leading dot
///
/// Returns None for entries that are empty after trimming.
pub fn normalize_extension(entry: &str) -> Option<String> {
    let ext = entry.trim().trim_start_matches('.').to_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Extracts the lowercase extension of the final path segment
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitetrawl::url::extension_of;
///
/// let url = Url::parse("https://example.com/img/Logo.PNG?v=2").unwrap();
/// assert_eq!(extension_of(&url), Some("png".to_string()));
///
/// let url = Url::parse("https://example.com/about").unwrap();
/// assert_eq!(extension_of(&url), None);
/// ```
pub fn extension_of(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_excludes_listed_extension() {
        let filter = ExtensionFilter::from_list("png,jpg");
        assert!(filter.is_excluded(&url("https://example.com/logo.png")));
        assert!(filter.is_excluded(&url("https://example.com/a/b/photo.jpg")));
        assert!(!filter.is_excluded(&url("https://example.com/index.html")));
    }

    #[test]
    fn test_case_insensitive() {
        let filter = ExtensionFilter::from_list("PNG, .Jpg");
        assert!(filter.is_excluded(&url("https://example.com/logo.png")));
        assert!(filter.is_excluded(&url("https://example.com/LOGO.PNG")));
        assert!(filter.is_excluded(&url("https://example.com/photo.JPG")));
    }

    #[test]
    fn test_no_extension_never_excluded() {
        let filter = ExtensionFilter::from_list("png");
        assert!(!filter.is_excluded(&url("https://example.com/")));
        assert!(!filter.is_excluded(&url("https://example.com/about")));
        assert!(!filter.is_excluded(&url("https://example.com/dir.png/")));
    }

    #[test]
    fn test_only_final_segment_counts() {
        let filter = ExtensionFilter::from_list("png");
        assert!(!filter.is_excluded(&url("https://example.com/logo.png/view")));
        assert!(!filter.is_excluded(&url("https://example.com/page?img=logo.png")));
    }

    #[test]
    fn test_uses_last_dot() {
        let filter = ExtensionFilter::from_list("gz");
        assert!(filter.is_excluded(&url("https://example.com/archive.tar.gz")));
        assert_eq!(
            extension_of(&url("https://example.com/archive.tar.gz")),
            Some("gz".to_string())
        );
    }

    #[test]
    fn test_empty_filter_excludes_nothing() {
        let filter = ExtensionFilter::from_list("");
        assert!(filter.is_empty());
        assert!(!filter.is_excluded(&url("https://example.com/logo.png")));
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(" .PNG "), Some("png".to_string()));
        assert_eq!(normalize_extension("css"), Some("css".to_string()));
        assert_eq!(normalize_extension("  "), None);
        assert_eq!(normalize_extension("."), None);
    }
}
