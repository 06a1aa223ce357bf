//! Streaming SHA-256 content hashing

use chrono::{DateTime, Utc};
use ferrodiff_types::{BlockSize, ContentDigest, Error, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::trace;

/// Result of hashing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    /// Content digest
    pub digest: ContentDigest,
    /// Number of bytes read through the hasher
    pub size: u64,
    /// Modification time reported when the file was opened
    pub modified: DateTime<Utc>,
}

/// Hashes files in fixed-size blocks so memory use does not grow with file size
#[derive(Debug, Clone, Copy, Default)]
pub struct FileHasher {
    block_size: BlockSize,
}

impl FileHasher {
    /// Create a hasher reading `block_size` bytes at a time
    pub fn new(block_size: BlockSize) -> Self {
        Self { block_size }
    }

    /// Block size used for reads
    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Hash a file by path
    ///
    /// Any I/O failure is reported for this path only.
    pub async fn hash_file(&self, path: &Path) -> Result<HashedFile> {
        let mut file = File::open(path).await.map_err(|e| Error::io_at(path, e))?;
        let metadata = file.metadata().await.map_err(|e| Error::io_at(path, e))?;
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.block_size.get()];
        let mut size = 0u64;

        loop {
            let count = file
                .read(&mut buffer)
                .await
                .map_err(|e| Error::io_at(path, e))?;

            if count == 0 {
                break;
            }

            hasher.update(&buffer[..count]);
            size += count as u64;
        }

        let digest = ContentDigest::from_hex(format!("{:x}", hasher.finalize()));
        trace!("Hashed {} ({} bytes): {}", path.display(), size, digest.short());

        Ok(HashedFile {
            digest,
            size,
            modified,
        })
    }
}

/// Hash an in-memory buffer with the same digest format as [`FileHasher`]
pub fn hash_bytes(data: &[u8]) -> ContentDigest {
    ContentDigest::from_hex(format!("{:x}", Sha256::digest(data)))
}
