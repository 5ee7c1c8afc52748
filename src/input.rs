//! Target input sources
//!
//! Exactly one source is active per run, chosen by precedence: an explicit URL, else a
//! list file, else standard input when it is piped.

use crate::url::normalize_target;
use crate::{ConfigError, TrawlError};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use url::Url;

/// Where root targets come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A single URL given on the command line
    Url(String),
    /// A file with one URL per line
    List(PathBuf),
    /// Newline-separated URLs piped on standard input
    Stdin,
}

impl InputSource {
    /// Picks the active source by precedence
    ///
    /// Fails with [`ConfigError::NoInputSource`] when no URL or list is given and
    /// standard input is a terminal.
    pub fn select(
        url: Option<String>,
        list: Option<PathBuf>,
        stdin_is_terminal: bool,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = url {
            Ok(Self::Url(url))
        } else if let Some(list) = list {
            Ok(Self::List(list))
        } else if !stdin_is_terminal {
            Ok(Self::Stdin)
        } else {
            Err(ConfigError::NoInputSource)
        }
    }

    /// Like [`InputSource::select`], checking the real standard input
    pub fn detect(url: Option<String>, list: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::select(url, list, std::io::stdin().is_terminal())
    }

    /// Reads the raw, non-blank target lines
    pub fn read_lines(&self) -> Result<Vec<String>, ConfigError> {
        let content = match self {
            Self::Url(url) => url.clone(),
            Self::List(path) => {
                std::fs::read_to_string(path).map_err(|source| ConfigError::TargetList {
                    path: path.display().to_string(),
                    source,
                })?
            }
            Self::Stdin => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        Ok(split_lines(&content))
    }

    /// Reads and normalizes every target
    ///
    /// Any malformed target is fatal, since it is operator input.
    pub fn load_targets(&self) -> Result<Vec<Url>, TrawlError> {
        let mut targets = Vec::new();
        for line in self.read_lines()? {
            targets.push(normalize_target(&line)?);
        }
        Ok(targets)
    }
}

/// Splits text into trimmed, non-blank lines
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
