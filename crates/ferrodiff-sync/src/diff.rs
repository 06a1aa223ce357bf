//! Difference detection between two directory indexes
//!
//! Two independent lenses are applied to the same pair of indexes. The
//! path lens compares keys (additions, deletions, modifications). The
//! content lens compares digests and reports every digest whose set of
//! paths differs between the trees (relocations). A moved file therefore
//! shows up in both lenses; they are not reconciled against each other.

use crate::compare::FileComparison;
use ferrodiff_index::DirectoryIndex;
use ferrodiff_types::ContentDigest;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Content present in both trees under different paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relocation {
    /// Shared content digest
    pub digest: ContentDigest,
    /// Paths holding this content in tree A
    pub paths_in_a: Vec<PathBuf>,
    /// Paths holding this content in tree B
    pub paths_in_b: Vec<PathBuf>,
}

/// Outcome of comparing tree A against tree B
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    /// Paths only in B
    pub additions: BTreeSet<PathBuf>,
    /// Paths only in A
    pub deletions: BTreeSet<PathBuf>,
    /// Paths in both with different content
    pub modifications: Vec<PathBuf>,
    /// Digests in both with different path sets, ordered by digest
    pub relocations: Vec<Relocation>,
}

impl DiffResult {
    /// No differences in any lens
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty()
            && self.deletions.is_empty()
            && self.modifications.is_empty()
            && self.relocations.is_empty()
    }

    /// At least one path was added, deleted or modified
    pub fn has_changes(&self) -> bool {
        !self.additions.is_empty() || !self.deletions.is_empty() || !self.modifications.is_empty()
    }

    /// Whether any content moved
    pub fn has_relocations(&self) -> bool {
        !self.relocations.is_empty()
    }

    /// Number of added paths
    pub fn addition_count(&self) -> usize {
        self.additions.len()
    }

    /// Number of deleted paths
    pub fn deletion_count(&self) -> usize {
        self.deletions.len()
    }

    /// Number of modified paths
    pub fn modification_count(&self) -> usize {
        self.modifications.len()
    }

    /// Number of relocated digests
    pub fn relocation_count(&self) -> usize {
        self.relocations.len()
    }
}

/// Stateless comparison of two indexes
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    /// Compare tree A against tree B
    pub fn compare(a: &DirectoryIndex, b: &DirectoryIndex) -> DiffResult {
        let paths_a = a.path_to_digest();
        let paths_b = b.path_to_digest();

        let additions: BTreeSet<PathBuf> = paths_b
            .keys()
            .filter(|path| !paths_a.contains_key(*path))
            .cloned()
            .collect();

        let deletions: BTreeSet<PathBuf> = paths_a
            .keys()
            .filter(|path| !paths_b.contains_key(*path))
            .cloned()
            .collect();

        // BTreeMap iteration keeps modifications sorted by path
        let modifications: Vec<PathBuf> = paths_a
            .iter()
            .filter_map(|(path, digest)| match paths_b.get(path) {
                Some(other) if other != digest => Some(path.clone()),
                _ => None,
            })
            .collect();

        let digests_b = b.digest_to_paths();
        let relocations: Vec<Relocation> = a
            .digest_to_paths()
            .iter()
            .filter_map(|(digest, in_a)| {
                let in_b = digests_b.get(digest)?;
                (in_a != in_b).then(|| Relocation {
                    digest: digest.clone(),
                    paths_in_a: in_a.iter().cloned().collect(),
                    paths_in_b: in_b.iter().cloned().collect(),
                })
            })
            .collect();

        debug!(
            "Diff: {} added, {} deleted, {} modified, {} relocated",
            additions.len(),
            deletions.len(),
            modifications.len(),
            relocations.len()
        );

        DiffResult {
            additions,
            deletions,
            modifications,
            relocations,
        }
    }

    /// Detailed comparison of one path present in both trees
    pub fn inspect(a: &DirectoryIndex, b: &DirectoryIndex, path: &Path) -> Option<FileComparison> {
        let record_a = a.record(path)?;
        let record_b = b.record(path)?;
        Some(FileComparison::between(path, record_a, record_b))
    }
}
