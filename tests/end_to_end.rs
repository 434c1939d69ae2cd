// End-to-end runs through the public library API with an in-memory commit source.

use std::fs;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use touchminer::commands::{Mode, RunRequest, run};
use touchminer::github::{CommitRef, CommitSource, FileTouch, LanguageBreakdown, RepoId};
use touchminer::mining::LanguageTable;
use touchminer::{MinerError, Result};

/// Serves `pages` of commits, then an empty page, and records every request.
struct RecordingSource {
    languages: Vec<&'static str>,
    pages: Vec<Vec<(CommitRef, Vec<&'static str>)>>,
    requests: Mutex<Vec<String>>,
}

impl RecordingSource {
    fn find(&self, sha: &str) -> Option<&(CommitRef, Vec<&'static str>)> {
        self.pages.iter().flatten().find(|(c, _)| c.sha == sha)
    }
}

#[async_trait]
impl CommitSource for RecordingSource {
    async fn fetch_commits(
        &self,
        _repo: &RepoId,
        path: Option<&str>,
        page: u32,
    ) -> Result<Vec<CommitRef>> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("list {} {}", path.unwrap_or("*"), page));
        let Some(commits) = self.pages.get(page as usize - 1) else {
            return Ok(Vec::new());
        };
        Ok(commits
            .iter()
            .filter(|(_, files)| path.is_none_or(|p| files.iter().any(|f| *f == p)))
            .map(|(c, _)| c.clone())
            .collect())
    }

    async fn fetch_commit_detail(&self, _repo: &RepoId, sha: &str) -> Result<Vec<FileTouch>> {
        self.requests.lock().unwrap().push(format!("detail {}", sha));
        let (commit, files) = self
            .find(sha)
            .ok_or_else(|| MinerError::NotFound(sha.to_string()))?;
        Ok(files
            .iter()
            .map(|f| FileTouch {
                path: f.to_string(),
                commit: commit.clone(),
            })
            .collect())
    }

    async fn fetch_languages(&self, _repo: &RepoId) -> Result<LanguageBreakdown> {
        self.requests.lock().unwrap().push("languages".to_string());
        Ok(self
            .languages
            .iter()
            .map(|l| (l.to_string(), 4096))
            .collect())
    }
}

fn commit(sha: &str, login: &str, day: u32) -> CommitRef {
    CommitRef {
        sha: sha.to_string(),
        author_login: Some(login.to_string()),
        author_name: Some(login.to_string()),
        author_email: Some(format!("{}@example.com", login)),
        date: Some(Utc.with_ymd_and_hms(2023, 6, day, 12, 30, 0).unwrap()),
    }
}

fn request(mode: Mode, temp_dir: &TempDir) -> RunRequest {
    let repo: RepoId = "scottyab/rootbeer".parse().unwrap();
    RunRequest {
        mode,
        output: temp_dir.path().join("data").join(mode.default_file_name(&repo)),
        repo,
        all_files: false,
        source_files: None,
        flush_on_error: false,
    }
}

#[tokio::test]
async fn test_java_repo_counts_only_java() {
    let temp_dir = TempDir::new().unwrap();
    let source = RecordingSource {
        languages: vec!["Java"],
        pages: vec![vec![(
            commit("c1", "alice", 1),
            vec!["src/A.java", "README.md", "build.gradle"],
        )]],
        requests: Mutex::new(Vec::new()),
    };

    let report = run(&source, &request(Mode::Touches, &temp_dir), &LanguageTable::default())
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(&report.output).unwrap(),
        "filename,touches\nsrc/A.java,1\n"
    );
    assert_eq!(report.summary.files, 1);
    assert_eq!(report.summary.touches, 1);
    assert_eq!(
        *source.requests.lock().unwrap(),
        vec!["languages", "list * 1", "detail c1", "list * 2"]
    );
}

#[tokio::test]
async fn test_two_authors_two_rows_in_fetch_order() {
    let temp_dir = TempDir::new().unwrap();
    let source = RecordingSource {
        languages: vec!["Java"],
        pages: vec![
            vec![(commit("c2", "alice", 2), vec!["src/A.java"])],
            vec![(commit("c1", "bob", 1), vec!["src/A.java"])],
        ],
        requests: Mutex::new(Vec::new()),
    };

    let report = run(&source, &request(Mode::Authors, &temp_dir), &LanguageTable::default())
        .await
        .unwrap();

    let text = fs::read_to_string(&report.output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "filename,author,date",
            "src/A.java,alice,2023-06-02T12:30:00Z",
            "src/A.java,bob,2023-06-01T12:30:00Z",
        ]
    );

    // Two non-empty pages, then the empty third page ends the scan.
    let requests = source.requests.lock().unwrap();
    assert_eq!(requests.iter().filter(|r| r.starts_with("list")).count(), 3);
}

#[tokio::test]
async fn test_history_from_count_pass() {
    let temp_dir = TempDir::new().unwrap();
    let source = RecordingSource {
        languages: vec!["Kotlin", "CMake"],
        pages: vec![vec![
            (commit("c3", "carol", 3), vec!["app/Main.kt", "CMakeLists.txt"]),
            (commit("c2", "alice", 2), vec!["app/Main.kt", "docs/notes.md"]),
        ]],
        requests: Mutex::new(Vec::new()),
    };

    let report = run(&source, &request(Mode::History, &temp_dir), &LanguageTable::default())
        .await
        .unwrap();

    let text = fs::read_to_string(&report.output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "filename,commit_sha,author_login,author_name,author_email,commit_date",
            "app/Main.kt,c3,carol,carol,carol@example.com,2023-06-03T12:30:00Z",
            "app/Main.kt,c2,alice,alice,alice@example.com,2023-06-02T12:30:00Z",
            "CMakeLists.txt,c3,carol,carol,carol@example.com,2023-06-03T12:30:00Z",
        ]
    );
    assert_eq!(report.summary.files, 2);
    assert_eq!(report.summary.touches, 3);
}
