//! Configuration management system for ferrodiff
//!
//! Settings are layered: built-in defaults, then an optional YAML/TOML/JSON
//! file, then `FERRODIFF_*` environment variables. Command-line flags are
//! applied on top by the binary. Nothing here is process-global; the loaded
//! [`Config`] is passed explicitly to every operation.
//!
//! # Examples
//!
//! ```rust
//! use ferrodiff_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .build()
//!     .expect("defaults are valid");
//!
//! assert_eq!(config.scan.workers.get(), 8);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use ferrodiff_types::{BlockSize, CollisionPolicy, DedupMode, SyncMode, WorkerCount};
use serde::{Deserialize, Serialize};

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Main configuration structure for ferrodiff
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Scanning and hashing
    #[serde(default)]
    pub scan: ScanConfig,
    /// Tree synchronization
    #[serde(default)]
    pub sync: SyncConfig,
    /// Duplicate handling
    #[serde(default)]
    pub dedup: DedupConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scanning and hashing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Number of concurrent hashing workers
    pub workers: WorkerCount,
    /// Read block size for streaming hashes
    pub block_size: BlockSize,
    /// How equal relative paths from different roots are keyed
    pub collision_policy: CollisionPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: WorkerCount::default(),
            block_size: BlockSize::default(),
            collision_policy: CollisionPolicy::Namespace,
        }
    }
}

/// Synchronization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Default sync mode
    pub mode: SyncMode,
    /// Carry the source modification time over to copied files
    pub preserve_timestamps: bool,
    /// Report actions without executing them
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mode: SyncMode::Copy,
            preserve_timestamps: true,
            dry_run: false,
        }
    }
}

/// Duplicate handling configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Default dedup mode
    pub mode: DedupMode,
    /// Report hardlink replacements without executing them
    pub dry_run: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scan.workers.get(), 8);
        assert_eq!(config.scan.block_size.get(), 64 * 1024);
        assert_eq!(config.scan.collision_policy, CollisionPolicy::Namespace);
        assert_eq!(config.sync.mode, SyncMode::Copy);
        assert!(config.sync.preserve_timestamps);
        assert_eq!(config.dedup.mode, DedupMode::Find);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("sync:\n  mode: mirror\n").unwrap();
        assert_eq!(config.sync.mode, SyncMode::Mirror);
        assert!(config.sync.preserve_timestamps);
        assert_eq!(config.scan, ScanConfig::default());
    }
}
