// Language-driven source file filter.
// Maps a repository's language breakdown to the extensions and filenames counted as source.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::github::{CommitSource, RepoId};

/// Set of language names reported for one repository.
pub type LanguageSet = BTreeSet<String>;

/// Language name to recognised entries. Entries starting with `.` are extensions;
/// anything else is a whole filename (e.g. `CMakeLists.txt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        let builtin: &[(&str, &[&str])] = &[
            ("Java", &[".java"]),
            ("Kotlin", &[".kt", ".kts"]),
            ("C", &[".c", ".h"]),
            ("C++", &[".cpp", ".cc", ".cxx", ".hpp", ".hh", ".hxx", ".h"]),
            ("CMake", &[".cmake", "CMakeLists.txt"]),
            ("Python", &[".py"]),
            ("Shell", &[".sh"]),
            ("Rust", &[".rs"]),
            ("Go", &[".go"]),
            ("JavaScript", &[".js", ".mjs", ".cjs"]),
            ("TypeScript", &[".ts", ".tsx"]),
        ];

        let entries = builtin
            .iter()
            .map(|(lang, exts)| {
                (
                    lang.to_string(),
                    exts.iter().map(|e| e.to_string()).collect(),
                )
            })
            .collect();

        Self { entries }
    }
}

impl LanguageTable {
    /// Empty table; nothing is ever a source file.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Replace or add languages. An override replaces that language's entries wholesale.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Vec<String>>) -> Self {
        for (lang, entries) in overrides {
            self.entries.insert(lang.clone(), entries.clone());
        }
        self
    }

    pub fn get(&self, language: &str) -> Option<&[String]> {
        self.entries.get(language).map(Vec::as_slice)
    }

    /// Build the filter for the given active languages. Unknown languages add nothing.
    pub fn filter_for(&self, languages: &LanguageSet) -> SourceFilter {
        let mut filter = SourceFilter::default();

        for lang in languages {
            let Some(entries) = self.get(lang) else {
                debug!("no extensions registered for language {}", lang);
                continue;
            };
            for entry in entries {
                if entry.starts_with('.') {
                    filter.extensions.insert(entry[1..].to_lowercase());
                } else if !entry.is_empty() {
                    filter.filenames.insert(entry.clone());
                }
            }
        }

        filter
    }
}

/// Allow-list of extensions (lower-cased, without the dot) and whole filenames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    extensions: HashSet<String>,
    filenames: HashSet<String>,
}

impl SourceFilter {
    /// Whether `path` counts as a source file.
    pub fn matches(&self, path: &str) -> bool {
        is_source_file(path, self)
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty() && self.filenames.is_empty()
    }

    /// Sorted extensions, for logging.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

/// True if the path's extension (case-insensitive) is allowed, or the path
/// ends with a registered whole filename.
pub fn is_source_file(path: &str, filter: &SourceFilter) -> bool {
    if filter.filenames.iter().any(|name| path.ends_with(name.as_str())) {
        return true;
    }

    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| filter.extensions.contains(&ext.to_lowercase()))
}

/// Look up the repository's languages once and derive its source filter.
pub async fn source_extensions<S: CommitSource + ?Sized>(
    source: &S,
    repo: &RepoId,
    table: &LanguageTable,
) -> Result<SourceFilter> {
    let breakdown = source.fetch_languages(repo).await?;
    let languages: LanguageSet = breakdown.into_keys().collect();
    info!(
        "{} languages: {}",
        repo,
        languages.iter().cloned().collect::<Vec<_>>().join(", ")
    );

    let filter = table.filter_for(&languages);
    if filter.is_empty() {
        warn!("no recognised source languages for {}; every file will be skipped", repo);
    } else {
        info!("source extensions: {}", filter.extensions().join(", "));
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(names: &[&str]) -> LanguageSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_java_only() {
        let filter = LanguageTable::default().filter_for(&langs(&["Java"]));
        assert!(is_source_file("src/A.java", &filter));
        assert!(!is_source_file("README.md", &filter));
        assert!(!is_source_file("build.gradle", &filter));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let filter = LanguageTable::default().filter_for(&langs(&["C++"]));
        assert!(is_source_file("lib/Core.CPP", &filter));
        assert!(is_source_file("lib/core.Hpp", &filter));

        let table = LanguageTable::empty()
            .with_overrides(&BTreeMap::from([("Odd".to_string(), vec![".XyZ".to_string()])]));
        let filter = table.filter_for(&langs(&["Odd"]));
        assert!(is_source_file("a.xyz", &filter));
        assert!(is_source_file("a.XYZ", &filter));
    }

    #[test]
    fn test_no_extension_is_not_source() {
        let filter = LanguageTable::default().filter_for(&langs(&["Shell", "C"]));
        assert!(!is_source_file("Makefile", &filter));
        assert!(!is_source_file("scripts/run", &filter));
        assert!(!is_source_file(".sh", &filter));
        assert!(is_source_file("scripts/run.sh", &filter));
    }

    #[test]
    fn test_whole_filename_needs_language() {
        let with_cmake = LanguageTable::default().filter_for(&langs(&["CMake"]));
        assert!(is_source_file("CMakeLists.txt", &with_cmake));
        assert!(is_source_file("native/CMakeLists.txt", &with_cmake));
        assert!(is_source_file("native/fooCMakeLists.txt", &with_cmake));
        assert!(!is_source_file("native/cmakelists.txt", &with_cmake));
        assert!(!is_source_file("native/CMakeLists.txt.bak", &with_cmake));
        assert!(!is_source_file("notes.txt", &with_cmake));

        let without = LanguageTable::default().filter_for(&langs(&["C"]));
        assert!(!is_source_file("native/CMakeLists.txt", &without));
    }

    #[test]
    fn test_unknown_language_excludes() {
        let filter = LanguageTable::default().filter_for(&langs(&["Brainfuck"]));
        assert!(filter.is_empty());
        assert!(!is_source_file("a.bf", &filter));
    }

    #[test]
    fn test_filter_is_stateless() {
        let filter = LanguageTable::default().filter_for(&langs(&["Java", "Kotlin"]));
        for path in ["a/B.kt", "x.java", "y.md", "Z"] {
            let first = filter.matches(path);
            for _ in 0..3 {
                assert_eq!(filter.matches(path), first);
            }
        }
    }

    #[test]
    fn test_override_replaces_entries() {
        let overrides = BTreeMap::from([("Java".to_string(), vec![".jav".to_string()])]);
        let table = LanguageTable::default().with_overrides(&overrides);
        assert_eq!(table.get("Java"), Some(&[".jav".to_string()][..]));
        assert_eq!(table.get("Kotlin").map(|e| e.len()), Some(2));
    }
}
