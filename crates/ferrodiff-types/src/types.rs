//! Core domain types shared by the index, diff and sync crates

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Hex-encoded SHA-256 content digest
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Number of hex characters shown by [`ContentDigest::short`]
    pub const SHORT_LEN: usize = 8;

    /// Wrap an already hex-encoded digest, normalising it to lowercase
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into().to_ascii_lowercase())
    }

    /// Full hex representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated form for human-readable reports
    pub fn short(&self) -> &str {
        self.0.get(..Self::SHORT_LEN).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One hashed file found during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileRecord {
    /// Position of the scan root this file was found under
    pub root: usize,
    /// Path relative to that root
    pub relative_path: PathBuf,
    /// Content digest
    pub digest: ContentDigest,
    /// Number of bytes hashed
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// How a sync treats files that only exist on the target side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SyncMode {
    /// Copy additions and modifications only
    #[default]
    Copy,
    /// Copy additions and modifications, delete files missing from the source
    Mirror,
}

impl SyncMode {
    /// Whether this mode removes files from the target
    pub fn deletes(self) -> bool {
        matches!(self, Self::Mirror)
    }
}

impl FromStr for SyncMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "copy" => Ok(Self::Copy),
            "mirror" => Ok(Self::Mirror),
            other => Err(Error::config(format!("Unsupported sync mode: {other}"))),
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Copy => "copy",
            Self::Mirror => "mirror",
        })
    }
}

/// Which side of a `compare(A, B)` result is brought up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncDirection {
    /// A is the source, B is updated
    AToB,
    /// B is the source, A is updated
    BToA,
}

/// What the dedup command does with the duplicate groups it finds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum DedupMode {
    /// Report duplicate groups only
    #[default]
    Find,
    /// Replace duplicates with hardlinks to the group master
    Link,
}

impl FromStr for DedupMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "find" => Ok(Self::Find),
            "link" => Ok(Self::Link),
            other => Err(Error::config(format!("Unsupported dedup mode: {other}"))),
        }
    }
}

/// How equal relative paths coming from different scan roots are keyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CollisionPolicy {
    /// Key by `root/relative_path` whenever more than one root is scanned
    #[default]
    Namespace,
    /// Key by relative path only; the later root wins on a collision
    LastWriterWins,
}
