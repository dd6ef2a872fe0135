//! Error types for the monitor

use thiserror::Error;

/// Errors reported by a frame source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Receiver could not be reached
    #[error("frame source unavailable: {0}")]
    Unavailable(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that end a monitoring session
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Frame source failed to open or to poll
    #[error("frame source error: {0}")]
    Source(#[from] SourceError),
}
