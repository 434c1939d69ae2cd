// Command line interface.
// Parses arguments, merges them with the config file, and dispatches a mining run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::commands::{self, Mode, RunRequest};
use crate::config::Config;
use crate::github::{GitHubClient, GitHubSource, RepoId, TokenPool};
use crate::logging::init_logging;

#[derive(Parser)]
#[command(name = "touchminer")]
#[command(about = "Mine GitHub commit history for per-file touch counts and author timelines")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(
        long = "token",
        global = true,
        help = "GitHub token; repeat to rotate (defaults to GITHUB_TOKENS or GITHUB_TOKEN)"
    )]
    pub tokens: Vec<String>,

    #[arg(long, global = true, help = "Write partial results if the run aborts")]
    pub flush_on_error: bool,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "More output (-v, -vv)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Only warnings and errors")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    #[arg(long, help = "Repository as owner/name (defaults to config `repo`)")]
    pub repo: Option<String>,

    #[arg(short, long, help = "Output CSV path")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Record every touched file, not only source files")]
    pub all_files: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count touches per source file (filename,touches).
    Touches {
        #[command(flatten)]
        run: RunArgs,
    },
    /// One row per source file touch with author and date (filename,author,date).
    Authors {
        #[command(flatten)]
        run: RunArgs,

        #[arg(long, help = "Only record files listed in an earlier touches CSV")]
        source_files: Option<PathBuf>,
    },
    /// Per-file commit history with full attribution.
    History {
        #[command(flatten)]
        run: RunArgs,

        #[arg(long, help = "Read the file list from an earlier touches CSV")]
        source_files: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    fn verbosity(&self) -> i8 {
        if self.quiet {
            -1
        } else {
            self.verbose.min(2) as i8
        }
    }

    /// Build the run request from flags and config. Fails before any network use.
    pub fn request(&self, config: &Config) -> crate::error::Result<RunRequest> {
        let (mode, run, source_files) = match &self.command {
            Commands::Touches { run } => (Mode::Touches, run, None),
            Commands::Authors { run, source_files } => {
                (Mode::Authors, run, source_files.clone())
            }
            Commands::History { run, source_files } => (Mode::History, run, source_files.clone()),
        };

        let repo: RepoId = run
            .repo
            .as_deref()
            .or(config.repo.as_deref())
            .ok_or_else(|| {
                crate::error::MinerError::Configuration(
                    "no repository given (use --repo or set `repo` in the config file)".into(),
                )
            })?
            .parse()?;

        let output = run
            .output
            .clone()
            .unwrap_or_else(|| config.output_dir.join(mode.default_file_name(&repo)));

        Ok(RunRequest {
            mode,
            repo,
            output,
            all_files: run.all_files,
            source_files,
            flush_on_error: self.flush_on_error || config.flush_on_error,
        })
    }

    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbosity());

        let config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;
        let request = self.request(&config).context("Invalid arguments")?;
        let tokens = TokenPool::from_env(self.tokens.clone()).context("Missing credentials")?;
        tracing::debug!("rotating across {} tokens", tokens.len());

        let client = GitHubClient::new(
            tokens,
            config.request.timeout(),
            config.request.retry_policy(),
        )
        .context("Failed to build GitHub client")?;
        let source = GitHubSource::new(client, config.per_page);

        commands::run(&source, &request, &config.language_table())
            .await
            .with_context(|| format!("Mining {} failed", request.repo))?;
        Ok(())
    }
}
