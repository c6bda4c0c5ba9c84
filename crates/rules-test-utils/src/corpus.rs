//! [`TestCorpus`] builder for rules-service test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Front-matter plus body for a generated `*.rules.md` file.
#[derive(Debug, Clone)]
pub struct RuleFile {
    title: String,
    tags: Vec<String>,
    applies_to: Vec<String>,
    parent_charter: String,
    body: String,
}

impl RuleFile {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            tags: Vec::new(),
            applies_to: Vec::new(),
            parent_charter: "charters/quality.charter.md".to_string(),
            body: format!("# {title}\n"),
        }
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn applies_to(mut self, kinds: &[&str]) -> Self {
        self.applies_to = kinds.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn charter(mut self, charter: &str) -> Self {
        self.parent_charter = charter.to_string();
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn render(&self) -> String {
        format!(
            "---\ntitle: {}\nversion: 1.0\nstatus: active\nowner: platform\nlast_updated: 2024-05-01\ntags: [{}]\napplies_to: [{}]\nparent_charter: {}\n---\n\n{}",
            self.title,
            self.tags.join(", "),
            self.applies_to.join(", "),
            self.parent_charter,
            self.body
        )
    }
}

/// A temporary directory holding a rule corpus, target documents and
/// agent folders.
///
/// # Example
///
/// ```rust,no_run
/// use rules_test_utils::{RuleFile, TestCorpus};
///
/// let corpus = TestCorpus::new();
/// corpus.write_rule("rules/decisions.rules.md", &RuleFile::new("Decisions"));
/// corpus.assert_frontmatter_field("rules/decisions.rules.md", "title", "Decisions");
/// ```
pub struct TestCorpus {
    temp_dir: TempDir,
}

impl Default for TestCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCorpus {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write `content` at `rel`, creating parent directories.
    pub fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn write_rule(&self, rel: &str, rule: &RuleFile) -> PathBuf {
        self.write_file(rel, &rule.render())
    }

    /// Write `.rules-service.yaml` at the root.
    pub fn write_config(&self, yaml: &str) -> PathBuf {
        self.write_file(".rules-service.yaml", yaml)
    }

    pub fn read(&self, rel: &str) -> String {
        let path = self.path(rel);
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Sorted file names directly under `rel`; empty when it does not exist.
    pub fn list_dir(&self, rel: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.path(rel)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Rule file names (`*.rules.md`) directly under `folder`, sorted.
    pub fn rule_files(&self, folder: &str) -> Vec<String> {
        self.list_dir(folder)
            .into_iter()
            .filter(|name| name.ends_with(".rules.md"))
            .collect()
    }

    /// # Panics
    /// Panics unless `folder` holds exactly the rule files in `expected`.
    pub fn assert_rule_files(&self, folder: &str, expected: &[&str]) {
        let actual = self.rule_files(folder);
        assert_eq!(actual, expected, "Unexpected rule files in {folder}");
    }

    /// # Panics
    /// Panics unless `folder` holds a byte-identical copy of the rule at `source`.
    pub fn assert_mirrored(&self, folder: &str, source: &str) {
        let name = Path::new(source)
            .file_name()
            .unwrap_or_else(|| panic!("Source has no file name: {source}"))
            .to_string_lossy();
        let copy = format!("{}/{}", folder.trim_end_matches('/'), name);
        assert!(
            self.read(&copy) == self.read(source),
            "{copy} is not an exact copy of {source}"
        );
    }

    /// # Panics
    /// Panics unless the front-matter block of `rel` sets `key` to `value`.
    ///
    /// Only top-level scalar entries are inspected; surrounding quotes are
    /// ignored.
    pub fn assert_frontmatter_field(&self, rel: &str, key: &str, value: &str) {
        let content = self.read(rel);
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("---"), "{rel} has no front-matter block");

        let prefix = format!("{key}:");
        let found = lines
            .take_while(|line| *line != "---")
            .find_map(|line| line.strip_prefix(prefix.as_str()))
            .map(|raw| raw.trim().trim_matches('"').trim_matches('\''));
        assert_eq!(found, Some(value), "front-matter field {key} in {rel}");
    }

    /// # Panics
    /// Panics unless `rel` holds `count` human-input comments labelled `label`.
    pub fn assert_human_input(&self, rel: &str, label: &str, count: usize) {
        let marker = format!("<!-- HUMAN-INPUT-REQUIRED: {label}\n");
        let content = self.read(rel);
        assert_eq!(
            content.matches(marker.as_str()).count(),
            count,
            "human-input comments labelled {label} in {rel}:\n{content}"
        );
    }
}
