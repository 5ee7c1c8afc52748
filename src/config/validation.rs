use crate::config::types::{Config, CrawlerConfig, OutputConfig, ProxyConfig};
use crate::output::OutputFormat;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_proxy_config(&config.proxy)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeout must be >= 1 second".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(scope) = &config.scope {
        validate_domain_pattern(scope)?;
    }

    let endpoint = Url::parse(&config.archive_endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid archive_endpoint '{}': {}",
            config.archive_endpoint, e
        ))
    })?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "archive_endpoint '{}' must use HTTP or HTTPS",
            config.archive_endpoint
        )));
    }

    Ok(())
}

/// Validates proxy configuration
///
/// The proxy URIs themselves are checked when the pool is loaded.
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    if let Some(source) = &config.source {
        if source.trim().is_empty() {
            return Err(ConfigError::Validation(
                "proxy source cannot be empty".to_string(),
            ));
        }
    }

    if let Some(auth) = &config.auth {
        match auth.split_once(':') {
            Some((user, _)) if !user.is_empty() => {}
            _ => {
                return Err(ConfigError::Validation(
                    "proxy auth must be formatted as username:password".to_string(),
                ))
            }
        }
    }

    Ok(())
}

/// Validates output configuration
///
/// The encoding is resolved here so an unusable output path fails before any crawling.
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output path cannot be empty".to_string(),
            ));
        }

        OutputFormat::resolve(path, config.json)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
    }

    Ok(())
}

/// Validates a scope pattern (supports `*` wildcards)
pub(crate) fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    let pattern = pattern.trim();

    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Scope pattern cannot be empty".to_string(),
        ));
    }

    let base = pattern.strip_prefix("*.").unwrap_or(pattern);
    if base.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "Scope pattern '{}' has no domain after the wildcard",
            pattern
        )));
    }

    if !base
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '*')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Scope pattern '{}' contains invalid characters",
            pattern
        )));
    }

    if base.starts_with('.') || base.ends_with('.') || base.starts_with('-') || base.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Scope pattern '{}' cannot start or end with '.' or '-'",
            pattern
        )));
    }

    if base.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Scope pattern '{}' cannot contain consecutive dots",
            pattern
        )));
    }

    Ok(())
}
