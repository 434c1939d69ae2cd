// GitHub API module.
// Client, credential rotation, retries, and paged commit fetching.

pub mod client;
pub mod endpoints;
pub mod pager;
pub mod retry;
pub mod tokens;
pub mod types;

pub use client::GitHubClient;
pub use pager::{CommitPager, CommitSource, GitHubSource, fetch_all_commits};
pub use retry::RetryPolicy;
pub use tokens::{TokenPool, next_credential};
pub use types::*;
