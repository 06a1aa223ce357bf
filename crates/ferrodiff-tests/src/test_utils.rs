//! Unified test utilities for ferrodiff tests

use ferrodiff_index::{DirectoryIndex, ScanOptions, Scanner};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test data generation patterns
#[derive(Debug, Clone, Copy)]
pub enum TestDataPattern {
    /// All zeros
    Zeros,
    /// Deterministic byte sequence derived from a seed
    Seeded(u8),
}

/// Generate test data with specified pattern
pub fn generate_test_data(size: usize, pattern: TestDataPattern) -> Vec<u8> {
    match pattern {
        TestDataPattern::Zeros => vec![0u8; size],
        TestDataPattern::Seeded(seed) => (0..size)
            .map(|i| ((i * 7 + 13 + seed as usize * 31) % 256) as u8)
            .collect(),
    }
}

/// A directory tree on disk that lives as long as the builder
#[derive(Debug)]
pub struct TreeBuilder {
    dir: TempDir,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Create an empty tree in a fresh temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Add a file, creating parent directories as needed
    pub fn file(self, relative: &str, contents: impl AsRef<[u8]>) -> Self {
        self.write(relative, contents);
        self
    }

    /// Add a file filled with generated data
    pub fn data(self, relative: &str, size: usize, pattern: TestDataPattern) -> Self {
        self.file(relative, generate_test_data(size, pattern))
    }

    /// Add an empty directory
    pub fn dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.join(relative)).expect("Failed to create directory");
        self
    }

    /// Root of the tree
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of an entry
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write or overwrite a file after the tree was built
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, contents).expect("Failed to write test file");
    }

    /// Read a file
    pub fn read(&self, relative: &str) -> Vec<u8> {
        fs::read(self.join(relative)).expect("Failed to read test file")
    }

    /// Whether an entry exists
    pub fn exists(&self, relative: &str) -> bool {
        self.join(relative).exists()
    }

    /// Remove a file
    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.join(relative)).expect("Failed to remove test file");
    }

    /// Scan this tree with default options
    pub async fn scan(&self) -> DirectoryIndex {
        scan_roots(&[self.path()], ScanOptions::default()).await
    }
}

/// Scan several roots into one index
pub async fn scan_roots(roots: &[&Path], options: ScanOptions) -> DirectoryIndex {
    Scanner::new(options)
        .scan(roots)
        .await
        .expect("Scan failed")
}
