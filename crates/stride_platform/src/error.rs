//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Failed to run or create the event loop
    #[error("Event loop failed: {0}")]
    EventLoop(String),

    /// Feature not supported on this device class
    #[error("Not supported: {0}")]
    Unsupported(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
