//! Per-file comparison of two hashed records

use chrono::{DateTime, Utc};
use ferrodiff_types::FileRecord;
use serde::Serialize;
use std::path::PathBuf;

/// Field-by-field comparison of one file as seen in two trees
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileComparison {
    /// Index key both records were found under
    pub path: PathBuf,
    /// Both records have the same path relative to their root
    pub same_position: bool,
    /// Byte counts differ
    pub size_differs: bool,
    /// Modification times differ at whole-second precision
    pub modified_differs: bool,
    /// Content digests differ
    pub digest_differs: bool,
    /// Size on side A
    pub size_a: u64,
    /// Size on side B
    pub size_b: u64,
    /// Modification time on side A
    pub modified_a: DateTime<Utc>,
    /// Modification time on side B
    pub modified_b: DateTime<Utc>,
}

impl FileComparison {
    /// Compare two records stored under the same key
    pub fn between(path: impl Into<PathBuf>, a: &FileRecord, b: &FileRecord) -> Self {
        Self {
            path: path.into(),
            same_position: a.relative_path == b.relative_path,
            size_differs: a.size != b.size,
            modified_differs: a.modified.timestamp() != b.modified.timestamp(),
            digest_differs: a.digest != b.digest,
            size_a: a.size,
            size_b: b.size,
            modified_a: a.modified,
            modified_b: b.modified,
        }
    }

    /// Nothing but the timestamp may differ
    pub fn is_identical(&self) -> bool {
        self.same_position && !self.size_differs && !self.digest_differs
    }

    /// Content changed even though the size stayed the same
    pub fn is_same_size_edit(&self) -> bool {
        self.digest_differs && !self.size_differs
    }
}
