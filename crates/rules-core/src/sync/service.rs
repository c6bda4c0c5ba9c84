//! Mirroring the rule corpus into agent folders

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use rules_fs::{FileHashCache, is_rules_file_name};
use rules_meta::{AgentFolder, ConflictStrategy, RulesServiceConfig, RuleDocument};

use super::result::{SyncAction, SyncResult};
use super::status::FolderStatus;
use crate::{Error, Result};

pub struct SyncService {
    config: RulesServiceConfig,
    root: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
    pool: rayon::ThreadPool,
    hashes: FileHashCache,
}

impl SyncService {
    /// Agent folder paths are resolved against `root`.
    ///
    /// # Errors
    ///
    /// [`Error::Glob`] for an invalid include or exclude pattern and
    /// [`Error::ThreadPool`] when the worker pool cannot be built.
    pub fn new(config: RulesServiceConfig, root: impl Into<PathBuf>) -> Result<Self> {
        let include = build_globset(&config.sync.include_patterns)?;
        let exclude = build_globset(&config.sync.exclude_patterns)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.performance.max_parallel_operations.max(1))
            .thread_name(|i| format!("rules-sync-{i}"))
            .build()?;
        let hashes = FileHashCache::new(config.performance.checksum_algorithm);

        Ok(Self {
            config,
            root: root.into(),
            include,
            exclude,
            pool,
            hashes,
        })
    }

    pub fn config(&self) -> &RulesServiceConfig {
        &self.config
    }

    fn folder_dir(&self, folder: &AgentFolder) -> PathBuf {
        self.root.join(folder.path.to_native())
    }

    /// Documents whose file name passes the include and exclude globs.
    pub fn filter_documents<'a>(&self, documents: &'a [RuleDocument]) -> Vec<&'a RuleDocument> {
        documents
            .iter()
            .filter(|doc| {
                doc.file_name()
                    .is_some_and(|name| self.include.is_match(name) && !self.exclude.is_match(name))
            })
            .collect()
    }

    /// Target file name to source path. On a name clash the later source wins.
    fn planned_sources(&self, documents: &[RuleDocument]) -> BTreeMap<String, PathBuf> {
        let mut planned = BTreeMap::new();
        for doc in self.filter_documents(documents) {
            let Some(name) = doc.file_name() else { continue };
            if let Some(previous) = planned.insert(name.to_string(), doc.file_path.clone()) {
                tracing::warn!(
                    file = name,
                    replaced = %previous.display(),
                    by = %doc.file_path.display(),
                    "two rule documents share a file name, the later one wins"
                );
            }
        }
        planned
    }

    /// Mirror `documents` into every enabled agent folder.
    ///
    /// With `dry_run` every comparison still runs but nothing is written,
    /// created or deleted.
    pub fn sync_rules(&self, documents: &[RuleDocument], dry_run: bool) -> SyncResult {
        let folders: Vec<&AgentFolder> = self.config.enabled_folders().collect();
        if folders.is_empty() {
            tracing::warn!("no agent folders enabled");
            return SyncResult::failure("No agent folders enabled in configuration");
        }

        let planned = self.planned_sources(documents);
        let mut total = SyncResult::default();
        for folder in folders {
            let result = self.sync_folder(folder, &planned, dry_run);
            tracing::info!(
                folder = %folder.path,
                added = result.added,
                updated = result.updated,
                deleted = result.deleted,
                skipped = result.skipped,
                errors = result.errors.len(),
                dry_run,
                "synced agent folder"
            );
            total.merge(result);
        }
        total
    }

    fn sync_folder(&self, folder: &AgentFolder, planned: &BTreeMap<String, PathBuf>, dry_run: bool) -> SyncResult {
        let dir = self.folder_dir(folder);
        let mut result = SyncResult::default();

        if !dir.is_dir() {
            if !self.config.sync.create_directories {
                let message = format!("Target directory does not exist: {}", dir.display());
                tracing::warn!("{message}");
                return SyncResult::failure(message);
            }
            if !dry_run {
                if let Err(e) = fs::create_dir_all(&dir) {
                    let message = format!("Failed to create {}: {e}", dir.display());
                    tracing::warn!("{message}");
                    return SyncResult::failure(message);
                }
            }
        }

        let outcomes: Vec<(PathBuf, std::result::Result<SyncAction, String>)> = self.pool.install(|| {
            planned
                .par_iter()
                .map(|(name, source)| {
                    let target = dir.join(name);
                    let outcome = self.sync_file(source, &target, dry_run);
                    (target, outcome)
                })
                .collect()
        });

        for (target, outcome) in outcomes {
            match outcome {
                Ok(action) => result.record(action, &target.display().to_string(), dry_run),
                Err(message) => {
                    tracing::warn!("{message}");
                    result.errors.push(message);
                }
            }
        }

        if self.config.sync.clean_orphaned {
            self.remove_orphans(&dir, planned, dry_run, &mut result);
        }
        result
    }

    fn sync_file(&self, source: &Path, target: &Path, dry_run: bool) -> std::result::Result<SyncAction, String> {
        let copy = || {
            if dry_run {
                return Ok(());
            }
            rules_fs::io::copy_atomic(source, target)
                .map_err(|e| format!("Error syncing {}: {e}", source.display()))
        };

        if !target.exists() {
            copy()?;
            return Ok(SyncAction::Added);
        }
        if self.same_content(source, target) {
            return Ok(SyncAction::Skipped);
        }

        match self.config.sync.conflict_strategy {
            ConflictStrategy::Overwrite => {
                copy()?;
                Ok(SyncAction::Updated)
            }
            ConflictStrategy::Skip => Ok(SyncAction::Skipped),
            ConflictStrategy::Ask => {
                tracing::info!(target = %target.display(), "target differs from source, left untouched");
                Ok(SyncAction::Skipped)
            }
        }
    }

    fn same_content(&self, source: &Path, target: &Path) -> bool {
        if self.config.performance.use_checksums {
            let hashed = self
                .hashes
                .get_hash(source)
                .and_then(|a| self.hashes.get_hash(target).map(|b| a == b));
            match hashed {
                Ok(same) => return same,
                Err(e) => {
                    tracing::warn!(error = %e, "hashing failed, comparing sizes instead");
                }
            }
        }

        match (fs::metadata(source), fs::metadata(target)) {
            (Ok(a), Ok(b)) => a.len() == b.len(),
            _ => false,
        }
    }

    fn remove_orphans(&self, dir: &Path, planned: &BTreeMap<String, PathBuf>, dry_run: bool, result: &mut SyncResult) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            // A folder that was never created in a dry run has no orphans.
            Err(_) if dry_run => return,
            Err(e) => {
                result.errors.push(format!("Failed to list {}: {e}", dir.display()));
                return;
            }
        };

        let mut orphans = BTreeSet::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file && is_rules_file_name(&name) && !planned.contains_key(&name) {
                orphans.insert(entry.path());
            }
        }

        for orphan in orphans {
            if !dry_run {
                if let Err(e) = fs::remove_file(&orphan) {
                    let message = format!("Failed to delete orphan {}: {e}", orphan.display());
                    tracing::warn!("{message}");
                    result.errors.push(message);
                    continue;
                }
            }
            result.record(SyncAction::Deleted, &orphan.display().to_string(), dry_run);
        }
    }

    /// Status of every configured folder, keyed by its configured path.
    pub fn get_sync_status(&self, documents: &[RuleDocument]) -> BTreeMap<String, FolderStatus> {
        let planned = self.planned_sources(documents);

        self.config
            .agent_folders
            .iter()
            .map(|folder| {
                let dir = self.folder_dir(folder);
                let exists = dir.is_dir();
                let present: BTreeSet<String> = if exists {
                    fs::read_dir(&dir)
                        .map(|entries| {
                            entries
                                .flatten()
                                .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
                                .map(|e| e.file_name().to_string_lossy().into_owned())
                                .filter(|name| is_rules_file_name(name))
                                .collect()
                        })
                        .unwrap_or_default()
                } else {
                    BTreeSet::new()
                };
                let matching = planned.keys().filter(|name| present.contains(*name)).count();

                let status = FolderStatus {
                    description: folder.description.clone(),
                    enabled: folder.enabled,
                    exists,
                    rule_count: present.len(),
                    expected_count: planned.len(),
                    state: FolderStatus::evaluate(exists, present.len(), planned.len(), matching),
                };
                (folder.path.to_string(), status)
            })
            .collect()
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| Error::Glob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| Error::Glob {
        pattern: patterns.join(", "),
        source,
    })
}
