//! JSON output structures for the ferrodiff CLI

use ferrodiff_sync::{
    DiffResult, DuplicateGroup, DuplicateSummary, ExecutionReport, FileComparison, LinkAction,
    LinkReport, SyncPlan,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Operation metadata
#[derive(Debug, Serialize)]
pub struct OperationMetadata {
    /// ferrodiff version
    pub version: String,
    /// Operation type
    pub operation: String,
    /// Timestamp when the report was produced
    pub timestamp: String,
    /// Roots the operation worked on
    pub roots: Vec<PathBuf>,
}

impl OperationMetadata {
    /// Metadata for `operation` over `roots`
    pub fn new(operation: &str, roots: &[&Path]) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            operation: operation.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            roots: roots.iter().map(|r| r.to_path_buf()).collect(),
        }
    }
}

/// Output of `ferrodiff compare`
#[derive(Debug, Serialize)]
pub struct CompareJson<'a> {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Path and content differences
    pub diff: &'a DiffResult,
    /// Per-file detail for modified paths
    pub details: &'a [FileComparison],
    /// Files that could not be read
    pub skipped: Vec<PathBuf>,
}

/// Output of `ferrodiff duplicates` and `ferrodiff dedup --mode find`
#[derive(Debug, Serialize)]
pub struct DuplicatesJson<'a> {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Duplicate groups ordered by digest
    pub groups: &'a [DuplicateGroup],
    /// Totals
    pub summary: DuplicateSummary,
    /// Files that could not be read
    pub skipped: &'a [PathBuf],
}

/// Output of `ferrodiff sync`
#[derive(Debug, Serialize)]
pub struct SyncJson<'a> {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Planned actions
    pub plan: &'a SyncPlan,
    /// Execution outcome
    pub report: &'a ExecutionReport,
}

/// Output of `ferrodiff dedup --mode link`
#[derive(Debug, Serialize)]
pub struct DedupJson<'a> {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Planned replacements
    pub actions: &'a [LinkAction],
    /// Execution outcome, absent when the run was declined
    pub report: Option<&'a LinkReport>,
}

/// Print any report as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
