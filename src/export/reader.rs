// Source file list reader.
// Loads the first column of an earlier touch-count CSV as the file list for history runs.

use std::collections::HashSet;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{MinerError, Result};

/// Read file paths from the first column, skipping a `filename` header row,
/// blank rows, and repeats. Paths are kept verbatim, in order of first appearance.
pub fn read_source_files(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(MinerError::Configuration(format!(
            "source file list {} does not exist",
            path.display()
        )));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let Some(first) = record.get(0) else {
            continue;
        };
        if first.trim().is_empty() || (idx == 0 && first.trim().eq_ignore_ascii_case("filename")) {
            continue;
        }
        if seen.insert(first.to_string()) {
            files.push(first.to_string());
        }
    }

    Ok(files)
}
