// Run orchestration.
// Ties a commit source, a miner, and a CSV writer together for one command, including partial flushes.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::Result;
use crate::export::{read_source_files, write_author_touches, write_counts, write_file_histories};
use crate::github::{CommitSource, RepoId};
use crate::mining::{FileSelection, LanguageTable, Miner, RunSummary, TouchCounts, TouchLog};

/// Which table a run builds and which CSV layout it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `filename,touches`
    Touches,
    /// `filename,author,date`
    Authors,
    /// `filename,commit_sha,author_login,author_name,author_email,commit_date`
    History,
}

impl Mode {
    /// Output file name used when no explicit path is given.
    pub fn default_file_name(&self, repo: &RepoId) -> String {
        match self {
            Mode::Touches => format!("file_{}.csv", repo.name),
            Mode::Authors => format!("authors_{}.csv", repo.name),
            Mode::History => format!("file_touches_authors_dates_{}.csv", repo.name),
        }
    }
}

/// Everything one run needs besides the commit source.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub mode: Mode,
    pub repo: RepoId,
    pub output: PathBuf,
    /// Keep every touched path instead of only source files.
    pub all_files: bool,
    /// File list from an earlier touches CSV. Authors mode keeps only these files;
    /// history mode uses it instead of a count pass.
    pub source_files: Option<PathBuf>,
    /// Write what was aggregated before a fatal error.
    pub flush_on_error: bool,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub output: PathBuf,
}

/// Execute one run end to end.
pub async fn run<S: CommitSource + ?Sized>(
    source: &S,
    request: &RunRequest,
    table: &LanguageTable,
) -> Result<RunReport> {
    info!("mining {} ({:?})", request.repo, request.mode);

    let summary = match request.mode {
        Mode::Touches => {
            let miner =
                Miner::prepare(source, request.repo.clone(), table, request.all_files).await?;
            let mut counts = TouchCounts::new();
            let outcome = miner.count_touches(&mut counts).await;
            finish(outcome, request, || write_counts(&request.output, &counts))?;
            RunSummary::from(&counts)
        }
        Mode::Authors => {
            let miner = match &request.source_files {
                Some(list) => {
                    let files = read_source_files(list)?;
                    info!("{} source files loaded from {}", files.len(), list.display());
                    let selection = FileSelection::Listed(files.into_iter().collect());
                    Miner::new(source, request.repo.clone(), selection)
                }
                None => {
                    Miner::prepare(source, request.repo.clone(), table, request.all_files).await?
                }
            };
            let mut log = TouchLog::new();
            let outcome = miner.collect_author_touches(&mut log).await;
            finish(outcome, request, || write_author_touches(&request.output, &log))?;
            RunSummary::from(&log)
        }
        Mode::History => {
            let (miner, files) = match &request.source_files {
                Some(list) => {
                    let files = read_source_files(list)?;
                    info!("{} source files loaded from {}", files.len(), list.display());
                    let miner = Miner::new(source, request.repo.clone(), FileSelection::All);
                    (miner, files)
                }
                None => {
                    let miner =
                        Miner::prepare(source, request.repo.clone(), table, request.all_files)
                            .await?;
                    let mut counts = TouchCounts::new();
                    miner.count_touches(&mut counts).await?;
                    info!("{} source files detected", counts.len());
                    (miner, counts.paths())
                }
            };

            let mut log = TouchLog::new();
            let outcome = miner.collect_file_histories(&files, &mut log).await;
            finish(outcome, request, || write_file_histories(&request.output, &log))?;
            RunSummary::from(&log)
        }
    };

    report(&summary, &request.output);
    Ok(RunReport {
        summary,
        output: request.output.clone(),
    })
}

/// On success write the table; on failure optionally flush it, then return the original error.
fn finish<W>(outcome: Result<()>, request: &RunRequest, write: W) -> Result<()>
where
    W: FnOnce() -> Result<()>,
{
    match outcome {
        Ok(()) => write(),
        Err(e) => {
            error!("run aborted: {}", e);
            if request.flush_on_error {
                warn!("flushing partial results to {}", request.output.display());
                if let Err(write_err) = write() {
                    error!("partial flush failed: {}", write_err);
                }
            }
            Err(e)
        }
    }
}

fn report(summary: &RunSummary, output: &Path) {
    info!("Total number of files: {}", summary.files);
    info!("Total number of touches: {}", summary.touches);
    if let Some((file, count)) = &summary.most_touched {
        info!("The file {} has been touched {} times", file, count);
    }
    info!("File written to: {}", output.display());
}
