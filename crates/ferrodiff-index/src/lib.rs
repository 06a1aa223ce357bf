//! Parallel content hashing and directory indexes for ferrodiff
//!
//! This crate turns directory trees into content-addressed indexes:
//!
//! - **Hasher**: streams a file through SHA-256 in fixed-size blocks
//! - **Scanner**: enumerates one or more roots and hashes files with a bounded
//!   worker pool
//! - **DirectoryIndex**: immutable key→digest and digest→keys views
//!
//! # Examples
//!
//! ```rust,no_run
//! use ferrodiff_index::{ScanOptions, Scanner};
//!
//! # async fn example() -> ferrodiff_types::Result<()> {
//! let index = Scanner::new(ScanOptions::default()).scan(&["photos"]).await?;
//! println!("{} files, {} distinct contents", index.len(), index.digest_to_paths().len());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod hasher;
pub mod index;
pub mod scanner;

pub use hasher::{hash_bytes, FileHasher, HashedFile};
pub use index::DirectoryIndex;
pub use scanner::{enumerate, HashJob, ScanOptions, Scanner};
