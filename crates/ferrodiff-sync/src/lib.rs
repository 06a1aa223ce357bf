//! Tree comparison, duplicate detection and synchronization for ferrodiff
//!
//! This crate works on [`DirectoryIndex`](ferrodiff_index::DirectoryIndex)es
//! built by `ferrodiff-index`:
//!
//! - **Diff**: additions, deletions, modifications and relocations between two trees
//! - **Duplicates**: groups of files with identical content
//! - **Planning**: ordered copy/delete plans and hardlink plans, without side effects
//! - **Execution**: applying those plans to the filesystem with per-path error reporting
//!
//! # Examples
//!
//! ```rust,no_run
//! use ferrodiff_index::{ScanOptions, Scanner};
//! use ferrodiff_sync::{DiffEngine, SyncPlanner};
//! use ferrodiff_types::{SyncDirection, SyncMode};
//!
//! # async fn example() -> ferrodiff_types::Result<()> {
//! let scanner = Scanner::new(ScanOptions::default());
//! let a = scanner.scan(&["a"]).await?;
//! let b = scanner.scan(&["b"]).await?;
//!
//! let diff = DiffEngine::compare(&a, &b);
//! let plan = SyncPlanner::plan(&diff, SyncMode::Mirror, SyncDirection::AToB);
//! for action in &plan.actions {
//!     println!("{action}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod compare;
pub mod dedup;
pub mod diff;
pub mod duplicates;
pub mod executor;
pub mod planner;

pub use compare::FileComparison;
pub use dedup::{HardlinkPlanner, LinkAction, LinkExecutor, LinkReport};
pub use diff::{DiffEngine, DiffResult, Relocation};
pub use duplicates::{DuplicateFinder, DuplicateGroup, DuplicateSummary};
pub use executor::{
    ActionFailure, ExecutionObserver, ExecutionReport, ExecutorOptions, NoopObserver,
    SyncExecutor,
};
pub use planner::{SyncAction, SyncPlan, SyncPlanner};
