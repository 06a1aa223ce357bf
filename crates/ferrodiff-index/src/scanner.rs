//! Directory scanning with a bounded pool of hashing workers
//!
//! A scan runs in three phases:
//!
//! 1. Roots are validated. A missing root is a fatal error.
//! 2. Every regular file under every root is enumerated on the calling task.
//! 3. The file list is pushed into a job queue drained by a fixed number of
//!    worker tasks. Each worker sends its outcome over a result channel to a
//!    single collector, which is the only place records are merged.
//!
//! Files that fail to hash are logged and left out of the index.

use crate::hasher::FileHasher;
use crate::index::DirectoryIndex;
use ferrodiff_config::ScanConfig;
use ferrodiff_types::{BlockSize, CollisionPolicy, Error, FileRecord, Result, WorkerCount};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

/// Options controlling a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Number of concurrent hashing workers
    pub workers: WorkerCount,
    /// Read block size for hashing
    pub block_size: BlockSize,
    /// Keying of equal relative paths from different roots
    pub collision_policy: CollisionPolicy,
}

impl ScanOptions {
    /// Create scan options from the scan section of the main config
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            workers: config.workers,
            block_size: config.block_size,
            collision_policy: config.collision_policy,
        }
    }

    /// Set the worker count
    pub fn with_workers(mut self, workers: WorkerCount) -> Self {
        self.workers = workers;
        self
    }

    /// Set the collision policy
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}

/// A file waiting to be hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashJob {
    /// Position of the root the file belongs to
    pub root: usize,
    /// Path relative to that root
    pub relative_path: PathBuf,
    /// Path used to open the file
    pub absolute_path: PathBuf,
}

#[derive(Debug)]
enum HashOutcome {
    Hashed(FileRecord),
    Failed { path: PathBuf, error: Error },
}

/// Builds [`DirectoryIndex`]es from directory trees
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
    hasher: FileHasher,
}

impl Scanner {
    /// Create a scanner
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            hasher: FileHasher::new(options.block_size),
        }
    }

    /// Options this scanner was created with
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan one or more roots into a single index
    pub async fn scan<P: AsRef<Path>>(&self, roots: &[P]) -> Result<DirectoryIndex> {
        let start_time = Instant::now();
        let roots = validate_roots(roots)?;

        let jobs = enumerate(&roots);
        info!(
            "Enumerated {} files under {} root(s)",
            jobs.len(),
            roots.len()
        );

        let (records, skipped) = self.hash_all(jobs).await;
        let index = DirectoryIndex::build(roots, records, self.options.collision_policy)
            .with_skipped(skipped);

        info!(
            "Indexed {} files ({} skipped) in {:?}",
            index.len(),
            index.skipped().len(),
            start_time.elapsed()
        );

        Ok(index)
    }

    /// Hash every job with the worker pool and collect the outcomes
    async fn hash_all(&self, jobs: Vec<HashJob>) -> (Vec<FileRecord>, Vec<PathBuf>) {
        if jobs.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let worker_count = self.options.workers.get().min(jobs.len());
        let total = jobs.len();
        debug!("Hashing {} files with {} workers", total, worker_count);

        let (job_tx, job_rx) = mpsc::unbounded_channel::<HashJob>();
        let (result_tx, mut result_rx) = mpsc::channel::<HashOutcome>(worker_count * 4);

        for job in jobs {
            // The receiver is alive until the workers below finish.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let job_rx = Arc::new(Mutex::new(job_rx));
        let mut handles = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let hasher = self.hasher;

            handles.push(tokio::spawn(async move {
                loop {
                    let job = job_rx.lock().await.recv().await;
                    let Some(job) = job else { break };

                    let outcome = match hasher.hash_file(&job.absolute_path).await {
                        Ok(hashed) => HashOutcome::Hashed(FileRecord {
                            root: job.root,
                            relative_path: job.relative_path,
                            digest: hashed.digest,
                            size: hashed.size,
                            modified: hashed.modified,
                        }),
                        Err(error) => HashOutcome::Failed {
                            path: job.absolute_path,
                            error,
                        },
                    };

                    if result_tx.send(outcome).await.is_err() {
                        break;
                    }
                }
                trace!("Hash worker {} finished", worker_id);
            }));
        }
        drop(result_tx);

        let mut records = Vec::with_capacity(total);
        let mut skipped = Vec::new();

        while let Some(outcome) = result_rx.recv().await {
            match outcome {
                HashOutcome::Hashed(record) => records.push(record),
                HashOutcome::Failed { path, error } => {
                    warn!("Skipping unreadable file: {}", error);
                    skipped.push(path);
                }
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Hash worker terminated abnormally: {}", e);
            }
        }

        (records, skipped)
    }
}

/// Reject empty, missing, non-directory and repeated roots
fn validate_roots<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<PathBuf>> {
    if roots.is_empty() {
        return Err(Error::config("At least one root directory is required"));
    }

    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(roots.len());

    for root in roots {
        let root = root.as_ref();
        if !root.exists() {
            return Err(Error::invalid_root(root, "does not exist"));
        }
        if !root.is_dir() {
            return Err(Error::invalid_root(root, "is not a directory"));
        }
        if !seen.insert(root.to_path_buf()) {
            return Err(Error::invalid_root(root, "given more than once"));
        }
        validated.push(root.to_path_buf());
    }

    Ok(validated)
}

/// List every regular file under each root, in walk order
///
/// Symlinks are not followed. Unreadable directories are logged and skipped.
pub fn enumerate(roots: &[PathBuf]) -> Vec<HashJob> {
    let mut jobs = Vec::new();

    for (root_index, root) in roots.iter().enumerate() {
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative_path) = entry.path().strip_prefix(root) else {
                continue;
            };

            jobs.push(HashJob {
                root: root_index,
                relative_path: relative_path.to_path_buf(),
                absolute_path: entry.path().to_path_buf(),
            });
        }
    }

    jobs
}
