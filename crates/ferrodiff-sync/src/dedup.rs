//! Hardlink deduplication
//!
//! The first path of every duplicate group is its master. Every other member
//! is replaced by a hardlink to the master: the link is created under a
//! temporary sibling name and then renamed over the duplicate, so the
//! duplicate path never stops existing.

use crate::duplicates::DuplicateGroup;
use crate::executor::{temporary_sibling, ActionFailure, ExecutionObserver};
use ferrodiff_index::DirectoryIndex;
use ferrodiff_types::{ContentDigest, Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Replace `duplicate` with a hardlink to `master`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAction {
    /// Shared content digest
    pub digest: ContentDigest,
    /// Index key of the link target
    pub master: PathBuf,
    /// Index key of the file to replace
    pub duplicate: PathBuf,
}

/// Turns duplicate groups into link actions
#[derive(Debug, Clone, Copy, Default)]
pub struct HardlinkPlanner;

impl HardlinkPlanner {
    /// One action per non-master member of every group
    pub fn plan(groups: &[DuplicateGroup]) -> Vec<LinkAction> {
        groups
            .iter()
            .filter_map(|group| group.master().map(|master| (group, master)))
            .flat_map(|(group, master)| {
                group.redundant().iter().map(move |duplicate| LinkAction {
                    digest: group.digest.clone(),
                    master: master.clone(),
                    duplicate: duplicate.clone(),
                })
            })
            .collect()
    }
}

/// Outcome of executing link actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    /// Duplicates replaced by a hardlink (or that would be, in a dry run)
    pub linked: Vec<LinkAction>,
    /// Duplicates that already shared the master's inode
    pub already_linked: Vec<PathBuf>,
    /// Duplicates that could not be replaced
    pub failures: Vec<ActionFailure>,
    /// Storage freed by the new links
    pub reclaimed_bytes: u64,
    /// Nothing was changed on disk
    pub dry_run: bool,
}

impl LinkReport {
    /// No replacement failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replaces duplicates with hardlinks
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkExecutor {
    dry_run: bool,
}

impl LinkExecutor {
    /// Create a new link executor
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Execute link actions whose keys belong to `index`
    pub async fn execute<O>(
        &self,
        index: &DirectoryIndex,
        actions: &[LinkAction],
        observer: &O,
    ) -> LinkReport
    where
        O: ExecutionObserver + ?Sized,
    {
        let mut report = LinkReport {
            dry_run: self.dry_run,
            ..LinkReport::default()
        };

        for action in actions {
            match self.link_one(index, action).await {
                Ok(LinkOutcome::Linked) => {
                    observer.link_completed(action);
                    report.reclaimed_bytes += index
                        .record(&action.duplicate)
                        .map_or(0, |record| record.size);
                    report.linked.push(action.clone());
                }
                Ok(LinkOutcome::AlreadyLinked) => {
                    debug!("Already linked: {}", action.duplicate.display());
                    report.already_linked.push(action.duplicate.clone());
                }
                Err(error) => {
                    warn!("Could not link {}: {}", action.duplicate.display(), error);
                    observer.link_failed(action, &error);
                    report.failures.push(ActionFailure {
                        path: action.duplicate.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            "Dedup finished: {} linked, {} already linked, {} failed",
            report.linked.len(),
            report.already_linked.len(),
            report.failures.len()
        );
        report
    }

    async fn link_one(&self, index: &DirectoryIndex, action: &LinkAction) -> Result<LinkOutcome> {
        for key in [&action.master, &action.duplicate] {
            if !index.backs(key, &action.digest) {
                return Err(Error::link(
                    &action.duplicate,
                    format!(
                        "{} no longer holds content {}",
                        key.display(),
                        action.digest.short()
                    ),
                ));
            }
        }

        let master = resolve(index, &action.master)?;
        let duplicate = resolve(index, &action.duplicate)?;

        let master_meta = fs::metadata(&master).await.map_err(|e| {
            Error::link(&action.duplicate, format!("master {}: {e}", master.display()))
        })?;
        let duplicate_meta = fs::metadata(&duplicate)
            .await
            .map_err(|e| Error::link(&action.duplicate, e.to_string()))?;

        if same_file(&master_meta, &duplicate_meta) {
            return Ok(LinkOutcome::AlreadyLinked);
        }

        if self.dry_run {
            return Ok(LinkOutcome::Linked);
        }

        let temporary = temporary_sibling(&duplicate, "link")
            .ok_or_else(|| Error::link(&action.duplicate, "path has no file name"))?;

        fs::hard_link(&master, &temporary)
            .await
            .map_err(|e| Error::link(&action.duplicate, e.to_string()))?;

        if let Err(e) = fs::rename(&temporary, &duplicate).await {
            let _ = fs::remove_file(&temporary).await;
            return Err(Error::link(&action.duplicate, e.to_string()));
        }

        debug!("Linked: {} -> {}", duplicate.display(), master.display());
        Ok(LinkOutcome::Linked)
    }
}

enum LinkOutcome {
    Linked,
    AlreadyLinked,
}

fn resolve(index: &DirectoryIndex, key: &Path) -> Result<PathBuf> {
    index
        .absolute_path(key)
        .ok_or_else(|| Error::link(key, "not present in the index"))
}

#[cfg(unix)]
fn same_file(a: &std::fs::Metadata, b: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(_a: &std::fs::Metadata, _b: &std::fs::Metadata) -> bool {
    false
}
