use crate::config::types::Config;
use crate::config::validation::validate;
use crate::url::normalize_extension;
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Settings supplied on the command line
///
/// `None` / `false` means "not given", in which case the file value (or the default) is kept.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub scope: Option<String>,
    pub concurrency: Option<usize>,
    pub recursive: bool,
    pub timeout_secs: Option<u64>,
    pub ignore_ssl: bool,
    pub force_redirect: bool,
    /// Comma-separated list, e.g. "png,jpg"
    pub exclude: Option<String>,
    pub proxy: Option<String>,
    pub proxy_auth: Option<String>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub iterative: bool,
}

/// Parses TOML configuration text without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Builds the effective configuration for a run
///
/// Starts from the file at `path` (or defaults when no file is given), applies the
/// command-line overrides on top, then normalizes and validates the result.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitetrawl::config::{resolve_config, ConfigOverrides};
///
/// let config = resolve_config(Some(Path::new("sitetrawl.toml")), ConfigOverrides::default()).unwrap();
/// println!("Concurrency: {}", config.crawler.concurrency);
/// ```
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    apply_overrides(&mut config, overrides);
    normalize(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Applies command-line overrides to a configuration
fn apply_overrides(config: &mut Config, overrides: ConfigOverrides) {
    let crawler = &mut config.crawler;

    if let Some(scope) = overrides.scope {
        crawler.scope = Some(scope);
    }
    if let Some(concurrency) = overrides.concurrency {
        crawler.concurrency = concurrency;
    }
    if let Some(timeout) = overrides.timeout_secs {
        crawler.timeout_secs = Some(timeout);
    }
    if let Some(exclude) = overrides.exclude {
        crawler.exclude_extensions = exclude.split(',').map(str::to_string).collect();
    }
    crawler.recursive |= overrides.recursive;
    crawler.ignore_ssl |= overrides.ignore_ssl;
    crawler.force_redirect |= overrides.force_redirect;
    crawler.iterative |= overrides.iterative;

    if let Some(proxy) = overrides.proxy {
        config.proxy.source = Some(proxy);
    }
    if let Some(auth) = overrides.proxy_auth {
        config.proxy.auth = Some(auth);
    }

    if let Some(output) = overrides.output {
        config.output.path = Some(output);
    }
    config.output.json |= overrides.json;
}

/// Canonicalizes list-like values so the rest of the crate can rely on their shape
fn normalize(config: &mut Config) {
    let mut extensions: Vec<String> = config
        .crawler
        .exclude_extensions
        .iter()
        .filter_map(|e| normalize_extension(e))
        .collect();
    extensions.sort();
    extensions.dedup();
    config.crawler.exclude_extensions = extensions;

    if let Some(scope) = &config.crawler.scope {
        let scope = scope.trim().to_lowercase();
        config.crawler.scope = if scope.is_empty() { None } else { Some(scope) };
    }
}
