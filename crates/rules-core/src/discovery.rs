//! Rule document discovery
//!
//! Walks a root directory for `*.rules.md` files and keeps the parsed
//! documents in an immutable snapshot. A refresh builds a new snapshot and
//! swaps it in; readers holding the old one are unaffected.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use rules_content::frontmatter::{parse_mapping, split_strict};
use rules_fs::is_rules_file_name;
use rules_meta::RuleDocument;
use walkdir::{DirEntry, WalkDir};

use crate::{Error, Result};

/// Corpus keyed by source path.
pub type Snapshot = Arc<BTreeMap<PathBuf, RuleDocument>>;

/// Attribute used to order query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSortKey {
    #[default]
    Title,
    Version,
    Status,
    Owner,
    LastUpdated,
    FilePath,
    ParentCharter,
}

impl RuleSortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Version => "version",
            Self::Status => "status",
            Self::Owner => "owner",
            Self::LastUpdated => "last_updated",
            Self::FilePath => "file_path",
            Self::ParentCharter => "parent_charter",
        }
    }

    fn compare(&self, a: &RuleDocument, b: &RuleDocument) -> Ordering {
        match self {
            Self::Title => a.title.cmp(&b.title),
            Self::Version => a.version.cmp(&b.version),
            Self::Status => a.status.cmp(&b.status),
            Self::Owner => a.owner.cmp(&b.owner),
            Self::LastUpdated => a.last_updated.cmp(&b.last_updated),
            Self::FilePath => a.file_path.cmp(&b.file_path),
            Self::ParentCharter => a.parent_charter.cmp(&b.parent_charter),
        }
    }
}

impl fmt::Display for RuleSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleSortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "title" => Ok(Self::Title),
            "version" => Ok(Self::Version),
            "status" => Ok(Self::Status),
            "owner" => Ok(Self::Owner),
            "last_updated" => Ok(Self::LastUpdated),
            "file_path" => Ok(Self::FilePath),
            "parent_charter" => Ok(Self::ParentCharter),
            _ => Err(Error::InvalidSortKey { key: s.to_string() }),
        }
    }
}

/// Filter, order and page a tag query.
#[derive(Debug, Clone, Default)]
pub struct TagQuery<'a> {
    pub tags: &'a [&'a str],
    /// Every tag must be present when set, any one otherwise.
    pub match_all: bool,
    pub sort_by: RuleSortKey,
    pub limit: Option<usize>,
    pub offset: usize,
}

pub struct RuleDiscovery {
    root: PathBuf,
    snapshot: Option<Snapshot>,
    errors: Vec<String>,
}

impl RuleDiscovery {
    /// # Errors
    ///
    /// [`Error::RootNotFound`] when `root` is not a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::RootNotFound { path: root });
        }
        Ok(Self {
            root,
            snapshot: None,
            errors: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The current corpus, if a scan has happened.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot.clone()
    }

    /// Scan for rule documents, or return the cached corpus.
    ///
    /// Per-file problems never abort the scan; they come back as messages
    /// next to whatever parsed cleanly.
    pub fn discover_rules(&mut self, refresh: bool) -> (Vec<RuleDocument>, Vec<String>) {
        if refresh || self.snapshot.is_none() {
            let (corpus, errors) = self.scan();
            self.snapshot = Some(Arc::new(corpus));
            self.errors = errors;
        }

        let documents = self
            .snapshot
            .as_ref()
            .map(|s| s.values().cloned().collect())
            .unwrap_or_default();
        (documents, self.errors.clone())
    }

    fn scan(&self) -> (BTreeMap<PathBuf, RuleDocument>, Vec<String>) {
        let mut corpus = BTreeMap::new();
        let mut errors = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable entry during rule scan");
                    errors.push(format!("Error walking {}: {e}", self.root.display()));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !is_rules_file_name(&name) {
                continue;
            }

            match parse_rule_file(entry.path()) {
                Ok(Some(document)) => {
                    corpus.insert(entry.path().to_path_buf(), document);
                }
                Ok(None) => {
                    tracing::debug!(path = %entry.path().display(), "no front-matter, skipping");
                }
                Err(message) => {
                    tracing::warn!("{message}");
                    errors.push(message);
                }
            }
        }

        tracing::info!(
            root = %self.root.display(),
            documents = corpus.len(),
            errors = errors.len(),
            "rule scan complete"
        );
        (corpus, errors)
    }

    /// Documents carrying `query.tags`, sorted and paged.
    ///
    /// Scans first if nothing has been discovered yet.
    pub fn query_by_tags(&mut self, query: &TagQuery<'_>) -> Vec<RuleDocument> {
        if self.snapshot.is_none() {
            self.discover_rules(false);
        }
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Vec::new();
        };

        let mut matches: Vec<&RuleDocument> = snapshot
            .values()
            .filter(|doc| {
                if query.match_all {
                    doc.has_all_tags(query.tags)
                } else {
                    doc.has_any_tag(query.tags)
                }
            })
            .collect();
        matches.sort_by(|a, b| query.sort_by.compare(a, b));

        matches
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Documents whose parent charter maps to `category`.
    pub fn query_by_category(&mut self, category: &str) -> Vec<RuleDocument> {
        if self.snapshot.is_none() {
            self.discover_rules(false);
        }
        self.snapshot
            .iter()
            .flat_map(|s| s.values())
            .filter(|doc| doc.rule_category() == category)
            .cloned()
            .collect()
    }

    /// A cached document, or a freshly parsed one added to the cache.
    ///
    /// Relative paths are resolved against the discovery root.
    pub fn get_rule_by_path(&mut self, path: impl AsRef<Path>) -> Option<RuleDocument> {
        let path = path.as_ref();
        let key = if path.is_relative() {
            self.root.join(path)
        } else {
            path.to_path_buf()
        };

        if let Some(document) = self.snapshot.as_ref().and_then(|s| s.get(&key)) {
            return Some(document.clone());
        }

        match parse_rule_file(&key) {
            Ok(Some(document)) => {
                let snapshot = self.snapshot.get_or_insert_with(Default::default);
                Arc::make_mut(snapshot).insert(key, document.clone());
                Some(document)
            }
            Ok(None) => None,
            Err(message) => {
                tracing::warn!("{message}");
                None
            }
        }
    }
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_string_lossy().starts_with('.')
}

/// Parse one rules file. `Ok(None)` means it carries no front-matter.
fn parse_rule_file(path: &Path) -> std::result::Result<Option<RuleDocument>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;

    let block = match split_strict(&content) {
        Ok(Some(block)) => block,
        Ok(None) => return Ok(None),
        Err(_) => return Err(format!("Invalid frontmatter structure in {}", path.display())),
    };

    let mapping = match parse_mapping(block.raw) {
        Ok(Some(mapping)) => mapping,
        Ok(None) => return Ok(None),
        Err(rules_content::Error::NotAMapping) => {
            return Err(format!("Frontmatter in {} is not a mapping", path.display()));
        }
        Err(e) => return Err(format!("Error parsing YAML in {}: {e}", path.display())),
    };

    RuleDocument::from_frontmatter(mapping, path).map(Some).map_err(|e| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let detail = match e {
            rules_meta::Error::InvalidDocument { message, .. } => message,
            other => other.to_string(),
        };
        format!("Validation error for {name}: {detail}")
    })
}
