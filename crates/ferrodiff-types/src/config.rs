//! Validated configuration values
//!
//! Value types that can only hold values within their documented bounds.
//! Deserialization goes through the same validation as the constructors.

/// Number of concurrent hashing workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "usize", into = "usize")
)]
pub struct WorkerCount(usize);

impl WorkerCount {
    /// Minimum worker count
    pub const MIN: usize = 1;
    /// Maximum worker count
    pub const MAX: usize = 256;
    /// Default worker count
    pub const DEFAULT: usize = 8;

    /// Create a new worker count with validation
    pub fn new(count: usize) -> Result<Self, String> {
        if count < Self::MIN {
            Err(format!("Worker count {} is below minimum {}", count, Self::MIN))
        } else if count > Self::MAX {
            Err(format!("Worker count {} exceeds maximum {}", count, Self::MAX))
        } else {
            Ok(Self(count))
        }
    }

    /// Get the worker count value
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<usize> for WorkerCount {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkerCount> for usize {
    fn from(value: WorkerCount) -> Self {
        value.0
    }
}

/// Read block size used when streaming a file through the hasher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "usize", into = "usize")
)]
pub struct BlockSize(usize);

impl BlockSize {
    /// Minimum block size (4KB)
    pub const MIN: usize = 4 * 1024;
    /// Maximum block size (16MB)
    pub const MAX: usize = 16 * 1024 * 1024;
    /// Default block size (64KB)
    pub const DEFAULT: usize = 64 * 1024;

    /// Create a new block size with validation
    pub fn new(size: usize) -> Result<Self, String> {
        if size < Self::MIN {
            Err(format!("Block size {} is below minimum {}", size, Self::MIN))
        } else if size > Self::MAX {
            Err(format!("Block size {} exceeds maximum {}", size, Self::MAX))
        } else if !size.is_power_of_two() {
            Err(format!("Block size {} must be a power of two", size))
        } else {
            Ok(Self(size))
        }
    }

    /// Get the block size value
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<usize> for BlockSize {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BlockSize> for usize {
    fn from(value: BlockSize) -> Self {
        value.0
    }
}
