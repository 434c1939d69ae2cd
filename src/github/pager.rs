// Paged commit fetching.
// Walks page = 1, 2, 3, ... until the API returns an empty page.

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{CommitRef, FileTouch, LanguageBreakdown, RepoId};

/// Source of commit data. Implemented by `GitHubSource`; tests use in-memory stubs.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// One page of commits, newest first, optionally filtered by path.
    async fn fetch_commits(
        &self,
        repo: &RepoId,
        path: Option<&str>,
        page: u32,
    ) -> Result<Vec<CommitRef>>;

    /// Files touched by a commit, one touch per listed file.
    async fn fetch_commit_detail(&self, repo: &RepoId, sha: &str) -> Result<Vec<FileTouch>>;

    /// Language name to byte count for the repository.
    async fn fetch_languages(&self, repo: &RepoId) -> Result<LanguageBreakdown>;
}

/// `GitHubClient` bound to a page size.
pub struct GitHubSource {
    client: GitHubClient,
    per_page: u32,
}

impl GitHubSource {
    pub fn new(client: GitHubClient, per_page: u32) -> Self {
        Self { client, per_page }
    }
}

#[async_trait]
impl CommitSource for GitHubSource {
    async fn fetch_commits(
        &self,
        repo: &RepoId,
        path: Option<&str>,
        page: u32,
    ) -> Result<Vec<CommitRef>> {
        let summaries = self
            .client
            .list_commits(repo, path, page, self.per_page)
            .await?;
        Ok(summaries.iter().map(CommitRef::from).collect())
    }

    async fn fetch_commit_detail(&self, repo: &RepoId, sha: &str) -> Result<Vec<FileTouch>> {
        let detail = self.client.get_commit(repo, sha).await?;
        Ok(detail.into_touches())
    }

    async fn fetch_languages(&self, repo: &RepoId) -> Result<LanguageBreakdown> {
        self.client.get_languages(repo).await
    }
}

/// Cursor over the commit pages of one repository (and optional path filter).
///
/// Errors are returned as-is: only a successfully decoded empty page ends the scan.
pub struct CommitPager<'a, S: CommitSource + ?Sized> {
    source: &'a S,
    repo: &'a RepoId,
    path: Option<&'a str>,
    page: u32,
    done: bool,
}

impl<'a, S: CommitSource + ?Sized> CommitPager<'a, S> {
    pub fn new(source: &'a S, repo: &'a RepoId, path: Option<&'a str>) -> Self {
        Self {
            source,
            repo,
            path,
            page: 1,
            done: false,
        }
    }

    /// Fetch the next non-empty page, or `None` once an empty page was seen.
    pub async fn next_page(&mut self) -> Result<Option<Vec<CommitRef>>> {
        if self.done {
            return Ok(None);
        }

        let commits = self
            .source
            .fetch_commits(self.repo, self.path, self.page)
            .await?;

        if commits.is_empty() {
            self.done = true;
            return Ok(None);
        }

        info!(
            "{}: page {} ({} commits)",
            self.path.unwrap_or("commits"),
            self.page,
            commits.len()
        );
        self.page += 1;
        Ok(Some(commits))
    }
}

/// Collect every commit across all pages, in fetch order.
pub async fn fetch_all_commits<S: CommitSource + ?Sized>(
    source: &S,
    repo: &RepoId,
    path: Option<&str>,
) -> Result<Vec<CommitRef>> {
    let mut pager = CommitPager::new(source, repo, path);
    let mut commits = Vec::new();
    while let Some(page) = pager.next_page().await? {
        commits.extend(page);
    }
    Ok(commits)
}
