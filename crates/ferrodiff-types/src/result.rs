//! Result type alias for ferrodiff operations

use crate::Error;

/// Result type alias for ferrodiff operations
pub type Result<T> = std::result::Result<T, Error>;
