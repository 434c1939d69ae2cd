// CSV writers for the three aggregation modes.
// Rows follow table order (first-seen in count mode, fetch order in record modes); nothing is sorted.

use std::fs::{self, File};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::mining::{TouchCounts, TouchLog};

/// Count mode header.
pub const COUNT_HEADER: [&str; 2] = ["filename", "touches"];

/// Simple record mode header.
pub const SIMPLE_HEADER: [&str; 3] = ["filename", "author", "date"];

/// Detailed record mode header.
pub const DETAILED_HEADER: [&str; 6] = [
    "filename",
    "commit_sha",
    "author_login",
    "author_name",
    "author_email",
    "commit_date",
];

#[derive(Serialize)]
struct CountRow<'a> {
    filename: &'a str,
    touches: u64,
}

#[derive(Serialize)]
struct SimpleRow<'a> {
    filename: &'a str,
    author: Option<&'a str>,
    date: Option<String>,
}

#[derive(Serialize)]
struct DetailedRow<'a> {
    filename: &'a str,
    commit_sha: &'a str,
    author_login: Option<&'a str>,
    author_name: Option<&'a str>,
    author_email: Option<&'a str>,
    commit_date: Option<String>,
}

fn format_date(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Create parent directories, open (truncating) the file, and write the header row.
///
/// The header is written explicitly so that an empty table still yields a valid file.
fn open_with_header(path: &Path, header: &[&str]) -> Result<Writer<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(header)?;
    Ok(writer)
}

/// Write `filename,touches` rows.
pub fn write_counts(path: &Path, counts: &TouchCounts) -> Result<()> {
    let mut writer = open_with_header(path, &COUNT_HEADER)?;
    for (filename, touches) in counts.iter() {
        writer.serialize(CountRow { filename, touches })?;
    }
    writer.flush()?;

    info!("wrote {} rows to {}", counts.len(), path.display());
    Ok(())
}

/// Write `filename,author,date` rows.
pub fn write_author_touches(path: &Path, log: &TouchLog) -> Result<()> {
    let mut writer = open_with_header(path, &SIMPLE_HEADER)?;
    for row in log.rows() {
        writer.serialize(SimpleRow {
            filename: &row.filename,
            author: row.commit.author_name.as_deref(),
            date: format_date(row.commit.date),
        })?;
    }
    writer.flush()?;

    info!("wrote {} rows to {}", log.len(), path.display());
    Ok(())
}

/// Write the detailed per-commit rows.
pub fn write_file_histories(path: &Path, log: &TouchLog) -> Result<()> {
    let mut writer = open_with_header(path, &DETAILED_HEADER)?;
    for row in log.rows() {
        writer.serialize(DetailedRow {
            filename: &row.filename,
            commit_sha: &row.commit.sha,
            author_login: row.commit.author_login.as_deref(),
            author_name: row.commit.author_name.as_deref(),
            author_email: row.commit.author_email.as_deref(),
            commit_date: format_date(row.commit.date),
        })?;
    }
    writer.flush()?;

    info!("wrote {} rows to {}", log.len(), path.display());
    Ok(())
}
