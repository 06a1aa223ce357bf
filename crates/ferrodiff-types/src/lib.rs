//! Core type system and error handling for ferrodiff
//!
//! This crate provides the foundational types shared by every ferrodiff crate:
//!
//! - **Error handling**: one error enum with kind/severity classification
//! - **Domain records**: content digests and hashed file records
//! - **Modes**: sync, dedup and cross-root collision policies
//! - **Configuration values**: validated worker counts and block sizes
//!
//! # Features
//!
//! - `std` (default): Enable standard library features
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use ferrodiff_types::{Error, Result, SyncMode};
//!
//! fn parse_mode(raw: &str) -> Result<SyncMode> {
//!     raw.parse()
//! }
//!
//! assert_eq!(parse_mode("mirror").unwrap(), SyncMode::Mirror);
//! assert!(matches!(parse_mode("bogus"), Err(Error::Config { .. })));
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use config::{BlockSize, WorkerCount};
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use types::*;
