//! Final rendering of discovery records
//!
//! Sitetrawl writes its output file exactly once, at the end of the run (or when the
//! global timeout fires), overwriting any previous content. Discovered URLs are streamed
//! to stdout while the crawl is in progress, so the file never receives incremental appends.

use crate::output::record::DiscoveryRecord;
use crate::output::{OutputError, OutputResult};
use std::collections::BTreeSet;
use std::path::Path;

/// The two supported output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Sorted, deduplicated, newline-joined URLs
    Text,
    /// Indented JSON array of records
    Json,
}

impl OutputFormat {
    /// Chooses the encoding from the JSON flag and the file extension
    ///
    /// | JSON flag | extension | result |
    /// |-----------|-----------|--------|
    /// | set       | any       | Json   |
    /// | unset     | `.json`   | Json   |
    /// | unset     | `.txt`    | Text   |
    /// | unset     | other     | error  |
    pub fn resolve(path: &Path, json_flag: bool) -> OutputResult<Self> {
        if json_flag {
            return Ok(Self::Json);
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("txt") => Ok(Self::Text),
            Some("json") => Ok(Self::Json),
            _ => Err(OutputError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Renders the plain-text encoding
pub fn render_text(records: &[DiscoveryRecord]) -> String {
    let urls: BTreeSet<&str> = records.iter().map(|r| r.url.as_str()).collect();
    urls.into_iter().collect::<Vec<_>>().join("\n")
}

/// Renders the structured encoding
///
/// Records keep acceptance order; a URL appearing more than once keeps its first record.
pub fn render_json(records: &[DiscoveryRecord]) -> OutputResult<String> {
    let mut seen = BTreeSet::new();
    let unique: Vec<&DiscoveryRecord> = records
        .iter()
        .filter(|r| seen.insert(r.url.as_str()))
        .collect();

    Ok(serde_json::to_string_pretty(&unique)?)
}

/// Renders records in the given format
pub fn render(records: &[DiscoveryRecord], format: OutputFormat) -> OutputResult<String> {
    match format {
        OutputFormat::Text => Ok(render_text(records)),
        OutputFormat::Json => render_json(records),
    }
}

/// Resolves the format, renders, and overwrites the destination file
///
/// Nothing is written if the format cannot be resolved or rendering fails.
pub fn write_output(
    path: &Path,
    json_flag: bool,
    records: &[DiscoveryRecord],
) -> OutputResult<OutputFormat> {
    let format = OutputFormat::resolve(path, json_flag)?;
    let rendered = render(records, format)?;

    std::fs::write(path, rendered)?;
    tracing::info!(
        "Wrote {} records to {} ({:?})",
        records.len(),
        path.display(),
        format
    );

    Ok(format)
}
