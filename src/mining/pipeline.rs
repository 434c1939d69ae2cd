// Mining runs.
// Pages commits, expands each into file touches, filters, and folds into the caller's table.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::Result;
use crate::github::{CommitPager, CommitSource, FileTouch, RepoId};

use super::aggregate::{TouchCounts, TouchLog};
use super::filter::{LanguageTable, SourceFilter, source_extensions};

/// Which touched paths are kept.
#[derive(Debug, Clone)]
pub enum FileSelection {
    /// Only paths the language filter recognises.
    Source(SourceFilter),
    /// Exactly the listed paths.
    Listed(HashSet<String>),
    /// Every path.
    All,
}

impl FileSelection {
    pub fn accepts(&self, path: &str) -> bool {
        match self {
            FileSelection::Source(filter) => filter.matches(path),
            FileSelection::Listed(paths) => paths.contains(path),
            FileSelection::All => true,
        }
    }
}

/// One mining run against one repository.
///
/// Tables are passed in by the caller so that whatever was folded before a
/// failure is still available for a partial flush.
pub struct Miner<'a, S: CommitSource + ?Sized> {
    source: &'a S,
    repo: RepoId,
    selection: FileSelection,
}

impl<'a, S: CommitSource + ?Sized> Miner<'a, S> {
    pub fn new(source: &'a S, repo: RepoId, selection: FileSelection) -> Self {
        Self {
            source,
            repo,
            selection,
        }
    }

    /// Resolve the file selection (one language lookup unless `all_files`) and build the miner.
    pub async fn prepare(
        source: &'a S,
        repo: RepoId,
        table: &LanguageTable,
        all_files: bool,
    ) -> Result<Self> {
        let selection = if all_files {
            info!("recording every touched file");
            FileSelection::All
        } else {
            FileSelection::Source(source_extensions(source, &repo, table).await?)
        };
        Ok(Self::new(source, repo, selection))
    }

    /// Count mode: one increment per accepted touch across the whole history.
    pub async fn count_touches(&self, counts: &mut TouchCounts) -> Result<()> {
        self.for_each_touch(|touch| counts.record(&touch)).await
    }

    /// Simple record mode: one row per accepted touch across the whole history.
    pub async fn collect_author_touches(&self, log: &mut TouchLog) -> Result<()> {
        self.for_each_touch(|touch| log.record(touch)).await
    }

    /// Detailed record mode: for each file in order, every commit that touched it.
    pub async fn collect_file_histories(&self, files: &[String], log: &mut TouchLog) -> Result<()> {
        let total = files.len();
        for (idx, filename) in files.iter().enumerate() {
            info!("[{}/{}] {}", idx + 1, total, filename);

            let mut pager = CommitPager::new(self.source, &self.repo, Some(filename.as_str()));
            while let Some(commits) = pager.next_page().await? {
                for commit in commits {
                    log.record_commit(filename, commit);
                }
            }
        }
        Ok(())
    }

    /// Walk every commit page, fetch each commit's files, and hand accepted touches to `sink`.
    async fn for_each_touch<F>(&self, mut sink: F) -> Result<()>
    where
        F: FnMut(FileTouch),
    {
        let mut pager = CommitPager::new(self.source, &self.repo, None);
        while let Some(commits) = pager.next_page().await? {
            for commit in commits {
                let touches = self
                    .source
                    .fetch_commit_detail(&self.repo, &commit.sha)
                    .await?;
                debug!("{}: {} files", commit.sha, touches.len());

                for touch in touches {
                    if self.selection.accepts(&touch.path) {
                        info!(
                            "{}\t{}\t{}",
                            touch.path,
                            touch.commit.author_name.as_deref().unwrap_or("unknown"),
                            touch
                                .commit
                                .date
                                .map(|d| d.to_rfc3339())
                                .unwrap_or_default()
                        );
                        sink(touch);
                    } else {
                        debug!("skipping non-source file {}", touch.path);
                    }
                }
            }
        }
        Ok(())
    }
}
