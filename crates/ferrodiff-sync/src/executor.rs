//! Filesystem execution of sync plans

use crate::dedup::LinkAction;
use crate::planner::{SyncAction, SyncPlan};
use ferrodiff_config::SyncConfig;
use ferrodiff_types::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Receives execution events as they happen
///
/// Every method has an empty default so observers only implement what they
/// display.
pub trait ExecutionObserver: Send + Sync {
    /// A sync action is about to run (or would run, in a dry run)
    fn action_started(&self, _action: &SyncAction) {}

    /// A sync action failed
    fn action_failed(&self, _action: &SyncAction, _error: &Error) {}

    /// A duplicate now shares storage with its master
    fn link_completed(&self, _action: &LinkAction) {}

    /// A duplicate could not be replaced
    fn link_failed(&self, _action: &LinkAction, _error: &Error) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExecutionObserver for NoopObserver {}

/// A path whose action failed and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionFailure {
    /// Path relative to the roots
    pub path: PathBuf,
    /// Cause
    pub error: Error,
}

/// Outcome of executing a sync plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// Paths copied (or that would be copied)
    pub copied: Vec<PathBuf>,
    /// Paths deleted (or that would be deleted)
    pub deleted: Vec<PathBuf>,
    /// Deletes skipped because the target was already gone
    pub skipped: Vec<PathBuf>,
    /// Actions that failed
    pub failures: Vec<ActionFailure>,
    /// Bytes written by copies
    pub bytes_copied: u64,
    /// Nothing was changed on disk
    pub dry_run: bool,
}

impl ExecutionReport {
    /// No action failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Options for [`SyncExecutor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Carry the source modification time over to copies
    pub preserve_timestamps: bool,
    /// Report actions without running them
    pub dry_run: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            preserve_timestamps: true,
            dry_run: false,
        }
    }
}

impl ExecutorOptions {
    /// Create executor options from the sync section of the main config
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            preserve_timestamps: config.preserve_timestamps,
            dry_run: config.dry_run,
        }
    }

    /// Enable or disable dry-run
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Runs sync plans against the filesystem, one action at a time
#[derive(Debug, Clone, Default)]
pub struct SyncExecutor {
    options: ExecutorOptions,
}

impl SyncExecutor {
    /// Create a new executor
    pub fn new(options: ExecutorOptions) -> Self {
        Self { options }
    }

    /// Get the executor options
    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Execute `plan`, where `a_root` and `b_root` are the roots of the compared trees
    ///
    /// A failed action is reported and recorded; the remaining actions still run.
    pub async fn execute<O>(
        &self,
        plan: &SyncPlan,
        a_root: &Path,
        b_root: &Path,
        observer: &O,
    ) -> ExecutionReport
    where
        O: ExecutionObserver + ?Sized,
    {
        let source_root = plan.source_root(a_root, b_root);
        let target_root = plan.target_root(a_root, b_root);
        let mut report = ExecutionReport {
            dry_run: self.options.dry_run,
            ..ExecutionReport::default()
        };

        info!(
            "Executing {} actions: {} -> {}{}",
            plan.actions.len(),
            source_root.display(),
            target_root.display(),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        for action in &plan.actions {
            let relative = action.path();
            let target = target_root.join(relative);

            let outcome = match action {
                SyncAction::Copy(_) => {
                    observer.action_started(action);
                    if self.options.dry_run {
                        Ok(0)
                    } else {
                        self.copy_file(&source_root.join(relative), &target).await
                    }
                }
                SyncAction::Delete(_) => {
                    if !fs::try_exists(&target).await.unwrap_or(false) {
                        debug!("Already gone: {}", target.display());
                        report.skipped.push(relative.to_path_buf());
                        continue;
                    }
                    observer.action_started(action);
                    if self.options.dry_run {
                        Ok(0)
                    } else {
                        Self::delete_file(&target).await.map(|()| 0)
                    }
                }
            };

            match outcome {
                Ok(bytes) => match action {
                    SyncAction::Copy(path) => {
                        report.copied.push(path.clone());
                        report.bytes_copied += bytes;
                    }
                    SyncAction::Delete(path) => report.deleted.push(path.clone()),
                },
                Err(error) => {
                    warn!("{} failed: {}", action, error);
                    observer.action_failed(action, &error);
                    report.failures.push(ActionFailure {
                        path: relative.to_path_buf(),
                        error,
                    });
                }
            }
        }

        info!(
            "Sync finished: {} copied, {} deleted, {} failed",
            report.copied.len(),
            report.deleted.len(),
            report.failures.len()
        );
        report
    }

    /// Copy a single file, creating missing parent directories
    ///
    /// The copy is written to a temporary sibling and renamed over the
    /// destination, so other hardlinks to the old destination keep their content.
    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<u64> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_at(parent, e))?;
        }

        let temporary = temporary_sibling(destination, "copy").ok_or_else(|| {
            Error::io_at(destination, std::io::ErrorKind::InvalidInput.into())
        })?;

        match self.write_replacement(source, &temporary).await {
            Ok(bytes) => {
                if let Err(e) = fs::rename(&temporary, destination).await {
                    let _ = fs::remove_file(&temporary).await;
                    return Err(Error::io_at(destination, e));
                }
                debug!("Copied: {} -> {}", source.display(), destination.display());
                Ok(bytes)
            }
            Err(error) => {
                let _ = fs::remove_file(&temporary).await;
                Err(error)
            }
        }
    }

    async fn write_replacement(&self, source: &Path, temporary: &Path) -> Result<u64> {
        let bytes = fs::copy(source, temporary)
            .await
            .map_err(|e| Error::io_at(source, e))?;

        if self.options.preserve_timestamps {
            let metadata = fs::metadata(source)
                .await
                .map_err(|e| Error::io_at(source, e))?;

            if let Ok(modified) = metadata.modified() {
                filetime::set_file_mtime(
                    temporary,
                    filetime::FileTime::from_system_time(modified),
                )
                .map_err(|e| Error::io_at(temporary, e))?;
            }
        }

        Ok(bytes)
    }

    async fn delete_file(path: &Path) -> Result<()> {
        fs::remove_file(path)
            .await
            .map_err(|e| Error::io_at(path, e))?;
        debug!("Deleted: {}", path.display());
        Ok(())
    }
}

/// Hidden name next to `path` used while a replacement is prepared
pub(crate) fn temporary_sibling(path: &Path, purpose: &str) -> Option<PathBuf> {
    let name = path.file_name()?.to_string_lossy();
    Some(path.with_file_name(format!(".{name}.ferrodiff-{purpose}")))
}
