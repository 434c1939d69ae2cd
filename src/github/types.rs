// GitHub API response types and the mining data model built from them.
// Wire structs mirror the REST payloads; CommitRef and FileTouch are what the pipeline folds.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{MinerError, Result};

/// Repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// API path prefix for this repository.
    pub fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            MinerError::Configuration(format!(
                "invalid repository '{}', expected owner/name",
                s
            ))
        };

        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        let valid_part = |p: &str| {
            !p.is_empty()
                && p
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        if !valid_part(owner) || !valid_part(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// GitHub account attached to a commit (absent when the email is not linked).
#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub login: String,
}

/// Git-level author or committer signature.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Signature {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// The `commit` object nested in commit payloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitCommit {
    #[serde(default)]
    pub author: Option<Signature>,
}

/// Entry in the commit list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    #[serde(default)]
    pub commit: GitCommit,
    #[serde(default)]
    pub author: Option<UserRef>,
}

/// File entry in a commit detail payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitFile {
    pub filename: String,
}

/// Single commit payload. `files` is required: a detail without it is unusable.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub sha: String,
    #[serde(default)]
    pub commit: GitCommit,
    #[serde(default)]
    pub author: Option<UserRef>,
    pub files: Vec<CommitFile>,
}

/// Language breakdown: language name to byte count.
pub type LanguageBreakdown = BTreeMap<String, u64>;

/// Immutable reference to a fetched commit with its attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    pub sha: String,
    pub author_login: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl CommitRef {
    fn from_parts(sha: &str, commit: &GitCommit, author: &Option<UserRef>) -> Self {
        let signature = commit.author.clone().unwrap_or_default();
        Self {
            sha: sha.to_string(),
            author_login: author.as_ref().map(|u| u.login.clone()),
            author_name: signature.name,
            author_email: signature.email,
            date: signature.date,
        }
    }
}

impl From<&CommitSummary> for CommitRef {
    fn from(summary: &CommitSummary) -> Self {
        Self::from_parts(&summary.sha, &summary.commit, &summary.author)
    }
}

/// One observed modification of one file by one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTouch {
    pub path: String,
    pub commit: CommitRef,
}

impl CommitDetail {
    /// Expand the detail into one touch per listed file, in payload order.
    pub fn into_touches(self) -> Vec<FileTouch> {
        let commit = CommitRef::from_parts(&self.sha, &self.commit, &self.author);
        self.files
            .into_iter()
            .filter(|f| !f.filename.is_empty())
            .map(|f| FileTouch {
                path: f.filename,
                commit: commit.clone(),
            })
            .collect()
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
