//! Error types for RDS group decoding

use thiserror::Error;

use crate::group::GroupId;

/// Errors that can occur while decoding a single group
///
/// Decode errors are local to the field being decoded. The decoder that
/// reports one leaves its previously accumulated state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Header was routed to a decoder for a different group
    #[error("unexpected group: decoder handles {expected}, got {actual}")]
    UnexpectedGroup { expected: GroupId, actual: GroupId },

    /// Clock-time group carried an hour or minute out of range
    #[error("invalid clock time: {hour:02}:{minute:02}")]
    InvalidClock { hour: u8, minute: u8 },
}

/// Errors produced when parsing textual frame representations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Wrong number of blocks on a line
    #[error("expected 4 blocks, found {0}")]
    BlockCount(usize),

    /// A block was not a 16-bit hex value
    #[error("invalid block: {0}")]
    InvalidBlock(String),
}
