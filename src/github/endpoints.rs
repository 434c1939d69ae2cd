// GitHub API endpoint functions.
// Typed methods for the three read-only endpoints the miner consumes.

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{CommitDetail, CommitSummary, LanguageBreakdown, RepoId};

/// Maximum page size GitHub accepts for list endpoints.
pub const MAX_PER_PAGE: u32 = 100;

const NO_PARAMS: &[(&str, &str)] = &[];

impl GitHubClient {
    /// List one page of commits, optionally only those touching `path`.
    pub async fn list_commits(
        &self,
        repo: &RepoId,
        path: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CommitSummary>> {
        let mut params = vec![
            ("page", page.to_string()),
            ("per_page", per_page.clamp(1, MAX_PER_PAGE).to_string()),
        ];
        if let Some(path) = path {
            params.push(("path", path.to_string()));
        }

        self.get_json(&format!("{}/commits", repo.api_path()), &params)
            .await
    }

    /// Get a single commit including the files it touched.
    pub async fn get_commit(&self, repo: &RepoId, sha: &str) -> Result<CommitDetail> {
        self.get_json(&format!("{}/commits/{}", repo.api_path(), sha), NO_PARAMS)
            .await
    }

    /// Get the repository's language breakdown.
    pub async fn get_languages(&self, repo: &RepoId) -> Result<LanguageBreakdown> {
        self.get_json(&format!("{}/languages", repo.api_path()), NO_PARAMS)
            .await
    }
}
