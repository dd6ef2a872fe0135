//! Error types for the simulation layer

use thiserror::Error;

/// Errors building a simulated station or loading a frame log
#[derive(Debug, Error)]
pub enum SimError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Line of a frame log could not be parsed
    #[error("line {line}: {source}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Underlying parse failure
        #[source]
        source: rds_protocol::ParseError,
    },

    /// Station configuration is out of range
    #[error("invalid station configuration: {0}")]
    InvalidConfig(String),
}
