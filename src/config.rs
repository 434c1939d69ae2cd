// Configuration loading.
// Optional TOML file with request tuning, output location, and language table overrides.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{MinerError, Result};
use crate::github::RetryPolicy;
use crate::github::endpoints::MAX_PER_PAGE;
use crate::mining::LanguageTable;

/// Top-level config file. Credentials are deliberately not a field: a `tokens`
/// key is rejected as unknown.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default repository (`owner/name`) when `--repo` is not given.
    pub repo: Option<String>,
    /// Commits per list page (1..=100).
    pub per_page: u32,
    /// Directory for default output paths.
    pub output_dir: PathBuf,
    /// Write partial results when a run aborts.
    pub flush_on_error: bool,
    pub request: RequestConfig,
    /// Language name to extensions (`.kt`) or whole filenames (`CMakeLists.txt`).
    pub languages: BTreeMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: None,
            per_page: MAX_PER_PAGE,
            output_dir: PathBuf::from("data"),
            flush_on_error: false,
            request: RequestConfig::default(),
            languages: BTreeMap::new(),
        }
    }
}

/// Per-request timeout and retry budget.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RequestConfig {
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 4,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl RequestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms.max(self.base_delay_ms)),
        }
    }
}

/// Default config file location (~/.config/touchminer/config.toml on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "touchminer").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Load from an explicit path (must exist), else the default location if present,
    /// else built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            MinerError::Configuration(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.per_page = config.per_page.clamp(1, MAX_PER_PAGE);
        Ok(config)
    }

    /// Built-in language table with this file's overrides applied.
    pub fn language_table(&self) -> LanguageTable {
        LanguageTable::default().with_overrides(&self.languages)
    }
}
