//! Duplicate detection by content digest

use ferrodiff_index::DirectoryIndex;
use ferrodiff_types::ContentDigest;
use serde::Serialize;
use std::path::PathBuf;

/// Keys sharing one digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Shared content digest
    pub digest: ContentDigest,
    /// Size of one member
    pub size: u64,
    /// Member keys, sorted; always more than one
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// First path in sorted order, the one the others can be linked to
    pub fn master(&self) -> Option<&PathBuf> {
        self.paths.first()
    }

    /// Every member except the master
    pub fn redundant(&self) -> &[PathBuf] {
        self.paths.get(1..).unwrap_or_default()
    }

    /// Bytes freed if all but one member shared storage
    pub fn reclaimable_bytes(&self) -> u64 {
        self.size * (self.paths.len() as u64).saturating_sub(1)
    }
}

/// Totals over a list of duplicate groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateSummary {
    /// Number of groups
    pub groups: usize,
    /// Files that are not the master of their group
    pub redundant_files: usize,
    /// Sum of [`DuplicateGroup::reclaimable_bytes`]
    pub reclaimable_bytes: u64,
}

impl DuplicateSummary {
    /// Summarize a list of groups
    pub fn of(groups: &[DuplicateGroup]) -> Self {
        groups.iter().fold(Self::default(), |mut summary, group| {
            summary.groups += 1;
            summary.redundant_files += group.redundant().len();
            summary.reclaimable_bytes += group.reclaimable_bytes();
            summary
        })
    }
}

/// Finds groups of identical files in an index
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateFinder;

impl DuplicateFinder {
    /// Every digest mapped by more than one key, ordered by digest
    ///
    /// Keys whose current content has another digest (a record replaced under
    /// last-writer-wins) are not members.
    pub fn find(index: &DirectoryIndex) -> Vec<DuplicateGroup> {
        index
            .digest_to_paths()
            .iter()
            .filter_map(|(digest, paths)| {
                let paths: Vec<PathBuf> = paths
                    .iter()
                    .filter(|path| index.backs(path, digest))
                    .cloned()
                    .collect();
                if paths.len() < 2 {
                    return None;
                }
                let size = paths
                    .first()
                    .and_then(|key| index.record(key))
                    .map_or(0, |record| record.size);
                Some(DuplicateGroup {
                    digest: digest.clone(),
                    size,
                    paths,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ferrodiff_types::{CollisionPolicy, FileRecord};

    fn index_of(roots: &[&str], files: &[(usize, &str, &str, u64)]) -> DirectoryIndex {
        let records = files
            .iter()
            .map(|(root, path, digest, size)| FileRecord {
                root: *root,
                relative_path: PathBuf::from(path),
                digest: ContentDigest::from_hex(*digest),
                size: *size,
                modified: Utc::now(),
            })
            .collect();
        DirectoryIndex::build(
            roots.iter().map(PathBuf::from).collect(),
            records,
            CollisionPolicy::Namespace,
        )
    }

    #[test]
    fn test_find_groups() {
        let index = index_of(
            &["/r"],
            &[
                (0, "b.txt", "aa", 5),
                (0, "a.txt", "aa", 5),
                (0, "c.txt", "bb", 7),
            ],
        );

        let groups = DuplicateFinder::find(&index);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].paths,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
        assert_eq!(groups[0].master(), Some(&PathBuf::from("a.txt")));
        assert_eq!(groups[0].reclaimable_bytes(), 5);
    }

    #[test]
    fn test_no_duplicates() {
        let index = index_of(&["/r"], &[(0, "a", "11", 1), (0, "b", "22", 1)]);
        assert!(DuplicateFinder::find(&index).is_empty());
        assert_eq!(DuplicateSummary::of(&[]), DuplicateSummary::default());
    }

    #[test]
    fn test_groups_sorted_by_digest() {
        let index = index_of(
            &["/r"],
            &[
                (0, "z1", "ff", 1),
                (0, "z2", "ff", 1),
                (0, "a1", "00", 2),
                (0, "a2", "00", 2),
                (0, "a3", "00", 2),
            ],
        );

        let groups = DuplicateFinder::find(&index);
        assert_eq!(groups[0].digest.as_str(), "00");
        assert_eq!(groups[1].digest.as_str(), "ff");

        let summary = DuplicateSummary::of(&groups);
        assert_eq!(summary.groups, 2);
        assert_eq!(summary.redundant_files, 3);
        assert_eq!(summary.reclaimable_bytes, 2 * 2 + 1);
    }

    #[test]
    fn test_empty_group_has_no_master() {
        let group = DuplicateGroup {
            digest: ContentDigest::from_hex("aa"),
            size: 1,
            paths: Vec::new(),
        };
        assert_eq!(group.master(), None);
        assert!(group.redundant().is_empty());
        assert_eq!(group.reclaimable_bytes(), 0);
    }

    #[test]
    fn test_replaced_key_is_not_a_member() {
        // "same.txt" from /one held X but /two replaced it with unique content.
        let records = vec![
            FileRecord {
                root: 0,
                relative_path: PathBuf::from("same.txt"),
                digest: ContentDigest::from_hex("aa"),
                size: 9,
                modified: Utc::now(),
            },
            FileRecord {
                root: 1,
                relative_path: PathBuf::from("same.txt"),
                digest: ContentDigest::from_hex("bb"),
                size: 16,
                modified: Utc::now(),
            },
            FileRecord {
                root: 1,
                relative_path: PathBuf::from("other.txt"),
                digest: ContentDigest::from_hex("aa"),
                size: 9,
                modified: Utc::now(),
            },
        ];
        let index = DirectoryIndex::build(
            vec![PathBuf::from("/one"), PathBuf::from("/two")],
            records,
            CollisionPolicy::LastWriterWins,
        );

        assert!(DuplicateFinder::find(&index).is_empty());
    }

    #[test]
    fn test_duplicates_across_roots() {
        let index = index_of(
            &["/one", "/two"],
            &[(0, "same.txt", "aa", 3), (1, "same.txt", "aa", 3)],
        );

        let groups = DuplicateFinder::find(&index);
        assert_eq!(
            groups[0].paths,
            vec![
                PathBuf::from("/one/same.txt"),
                PathBuf::from("/two/same.txt")
            ]
        );
    }
}
