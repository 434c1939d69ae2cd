// Touch aggregation.
// Count mode folds touches into per-file totals; record mode keeps every touch in fetch order.

use std::collections::HashMap;

use crate::github::{CommitRef, FileTouch};

/// Per-file touch counts, iterated in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TouchCounts {
    order: Vec<String>,
    counts: HashMap<String, u64>,
}

impl TouchCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one touch. Keys are the literal API paths.
    pub fn record(&mut self, touch: &FileTouch) {
        self.record_path(&touch.path);
    }

    pub fn record_path(&mut self, path: &str) {
        match self.counts.get_mut(path) {
            Some(count) => *count += 1,
            None => {
                self.order.push(path.to_string());
                self.counts.insert(path.to_string(), 1);
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<u64> {
        self.counts.get(path).copied()
    }

    /// Number of distinct files.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all counts.
    pub fn total_touches(&self) -> u64 {
        self.counts.values().sum()
    }

    /// `(path, count)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.order
            .iter()
            .map(move |path| (path.as_str(), self.counts.get(path).copied().unwrap_or(0)))
    }

    /// Distinct paths in first-seen order.
    pub fn paths(&self) -> Vec<String> {
        self.order.clone()
    }

    /// The file with the highest count; ties go to the file seen first.
    pub fn most_touched(&self) -> Option<(&str, u64)> {
        let mut best: Option<(&str, u64)> = None;
        for (path, count) in self.iter() {
            match best {
                Some((_, top)) if top >= count => {}
                _ => best = Some((path, count)),
            }
        }
        best
    }
}

/// One recorded touch: which file, which commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchRecord {
    pub filename: String,
    pub commit: CommitRef,
}

/// Every touch in fetch order. Re-fetching the same commit records it again.
#[derive(Debug, Clone, Default)]
pub struct TouchLog {
    rows: Vec<TouchRecord>,
}

impl TouchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, touch: FileTouch) {
        self.rows.push(TouchRecord {
            filename: touch.path,
            commit: touch.commit,
        });
    }

    /// Record a commit against a file known up front (path-filtered commit listing).
    pub fn record_commit(&mut self, filename: &str, commit: CommitRef) {
        self.rows.push(TouchRecord {
            filename: filename.to_string(),
            commit,
        });
    }

    pub fn rows(&self) -> &[TouchRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct files touched.
    pub fn distinct_files(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .filter(|r| seen.insert(r.filename.as_str()))
            .count()
    }
}

/// End-of-run totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    pub touches: u64,
    pub most_touched: Option<(String, u64)>,
}

impl From<&TouchCounts> for RunSummary {
    fn from(counts: &TouchCounts) -> Self {
        Self {
            files: counts.len(),
            touches: counts.total_touches(),
            most_touched: counts.most_touched().map(|(p, c)| (p.to_string(), c)),
        }
    }
}

impl From<&TouchLog> for RunSummary {
    fn from(log: &TouchLog) -> Self {
        Self {
            files: log.distinct_files(),
            touches: log.len() as u64,
            most_touched: None,
        }
    }
}
