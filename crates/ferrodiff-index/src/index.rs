//! Content-addressed directory index
//!
//! A [`DirectoryIndex`] is built once from the records of a scan and never
//! mutated afterwards. It exposes two views over the same records:
//! key → digest and digest → keys. Both use ordered maps, so the index is
//! identical no matter in which order the records were produced.

use ferrodiff_types::{CollisionPolicy, ContentDigest, FileRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Immutable path↔digest index over one or more scan roots
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectoryIndex {
    roots: Vec<PathBuf>,
    collision_policy: CollisionPolicy,
    records: BTreeMap<PathBuf, FileRecord>,
    path_to_digest: BTreeMap<PathBuf, ContentDigest>,
    digest_to_paths: BTreeMap<ContentDigest, BTreeSet<PathBuf>>,
    skipped: Vec<PathBuf>,
}

impl DirectoryIndex {
    /// Build an index from hashed records
    ///
    /// Records are merged in `(root, relative_path)` order. Under
    /// [`CollisionPolicy::LastWriterWins`] a record from a later root replaces
    /// an earlier one with the same key in the key-based views, while the
    /// digest view keeps every observed `(digest, key)` pair. Use
    /// [`DirectoryIndex::backs`] before acting on a key taken from the digest
    /// view.
    pub fn build(
        roots: Vec<PathBuf>,
        mut records: Vec<FileRecord>,
        collision_policy: CollisionPolicy,
    ) -> Self {
        records.sort_by(|a, b| {
            a.root
                .cmp(&b.root)
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });

        let mut index = Self {
            roots,
            collision_policy,
            ..Self::default()
        };

        for record in records {
            let key = index.key_for(record.root, &record.relative_path);
            index
                .digest_to_paths
                .entry(record.digest.clone())
                .or_default()
                .insert(key.clone());
            index.path_to_digest.insert(key.clone(), record.digest.clone());
            index.records.insert(key, record);
        }

        index
    }

    /// Attach the paths that were dropped during the scan
    pub fn with_skipped(mut self, mut skipped: Vec<PathBuf>) -> Self {
        skipped.sort();
        self.skipped = skipped;
        self
    }

    /// Index key of a file found under `roots[root]`
    pub fn key_for(&self, root: usize, relative_path: &Path) -> PathBuf {
        match self.collision_policy {
            CollisionPolicy::Namespace if self.roots.len() > 1 => self
                .roots
                .get(root)
                .map_or_else(|| relative_path.to_path_buf(), |r| r.join(relative_path)),
            _ => relative_path.to_path_buf(),
        }
    }

    /// Roots this index was built from, in scan order
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Policy used to key records from several roots
    pub fn collision_policy(&self) -> CollisionPolicy {
        self.collision_policy
    }

    /// Number of indexed keys
    pub fn len(&self) -> usize {
        self.path_to_digest.len()
    }

    /// Whether the index holds no files
    pub fn is_empty(&self) -> bool {
        self.path_to_digest.is_empty()
    }

    /// Key → digest view
    pub fn path_to_digest(&self) -> &BTreeMap<PathBuf, ContentDigest> {
        &self.path_to_digest
    }

    /// Digest → keys view
    pub fn digest_to_paths(&self) -> &BTreeMap<ContentDigest, BTreeSet<PathBuf>> {
        &self.digest_to_paths
    }

    /// Digest of one key
    pub fn digest_of(&self, key: &Path) -> Option<&ContentDigest> {
        self.path_to_digest.get(key)
    }

    /// Whether `key` currently resolves to content with `digest`
    ///
    /// Under [`CollisionPolicy::LastWriterWins`] the digest view may still list
    /// a key whose record was replaced by a later root with other content.
    pub fn backs(&self, key: &Path, digest: &ContentDigest) -> bool {
        self.digest_of(key) == Some(digest)
    }

    /// Keys sharing a digest
    pub fn paths_for(&self, digest: &ContentDigest) -> Option<&BTreeSet<PathBuf>> {
        self.digest_to_paths.get(digest)
    }

    /// Record stored under a key
    pub fn record(&self, key: &Path) -> Option<&FileRecord> {
        self.records.get(key)
    }

    /// All records in key order
    pub fn records(&self) -> impl Iterator<Item = (&PathBuf, &FileRecord)> {
        self.records.iter()
    }

    /// Absolute location of a key on disk
    pub fn absolute_path(&self, key: &Path) -> Option<PathBuf> {
        let record = self.records.get(key)?;
        let root = self.roots.get(record.root)?;
        Some(root.join(&record.relative_path))
    }

    /// Total size of all indexed files
    pub fn total_bytes(&self) -> u64 {
        self.records.values().map(|r| r.size).sum()
    }

    /// Files that were found but could not be hashed
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    /// Keys the skipped files would have been indexed under
    pub fn skipped_keys(&self) -> BTreeSet<PathBuf> {
        self.skipped
            .iter()
            .filter_map(|path| {
                self.roots.iter().enumerate().find_map(|(root, dir)| {
                    path.strip_prefix(dir)
                        .ok()
                        .map(|relative| self.key_for(root, relative))
                })
            })
            .collect()
    }
}
