//! Raw RDS frames as delivered by the tuner
//!
//! A frame is one group instance: four 16-bit blocks plus the receiver's
//! "data ready" flag and its per-block error report.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Index of block A (Program Identification)
pub const BLOCK_A: usize = 0;
/// Index of block B (group type, version, flags)
pub const BLOCK_B: usize = 1;
/// Index of block C (payload)
pub const BLOCK_C: usize = 2;
/// Index of block D (payload)
pub const BLOCK_D: usize = 3;

/// Block error level reported by the receiver for one block
///
/// Follows the Si470x BLERA..BLERD encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockError {
    /// No errors
    #[default]
    None,
    /// 1-2 errors corrected
    Minor,
    /// 3-5 errors corrected
    Major,
    /// 6 or more errors, block is uncorrectable
    Uncorrectable,
}

impl BlockError {
    /// Decode a 2-bit error field
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::None,
            1 => Self::Minor,
            2 => Self::Major,
            _ => Self::Uncorrectable,
        }
    }

    /// Encode to the 2-bit error field
    pub fn bits(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Minor => 1,
            Self::Major => 2,
            Self::Uncorrectable => 3,
        }
    }
}

/// Error levels for all four blocks of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockErrors(pub [BlockError; 4]);

impl BlockErrors {
    /// Worst error level across the four blocks
    pub fn worst(&self) -> BlockError {
        self.0.iter().copied().max().unwrap_or_default()
    }

    /// True if any block is uncorrectable
    pub fn any_uncorrectable(&self) -> bool {
        self.worst() == BlockError::Uncorrectable
    }
}

/// One RDS group instance as read from the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Blocks A, B, C, D
    pub blocks: [u16; 4],
    /// Receiver has a new group available
    pub ready: bool,
    /// Reported error level per block
    pub block_errors: BlockErrors,
}

impl Frame {
    /// Create a ready frame with no reported errors
    pub fn new(blocks: [u16; 4]) -> Self {
        Self {
            blocks,
            ready: true,
            block_errors: BlockErrors::default(),
        }
    }

    /// Create a frame with the ready flag cleared
    pub fn not_ready() -> Self {
        Self::default()
    }

    /// Attach a block error report
    pub fn with_errors(mut self, block_errors: BlockErrors) -> Self {
        self.block_errors = block_errors;
        self
    }

    /// Program Identification (block A)
    pub fn pi(&self) -> u16 {
        self.blocks[BLOCK_A]
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.blocks;
        write!(f, "{:04X} {:04X} {:04X} {:04X}", a, b, c, d)
    }
}

impl FromStr for Frame {
    type Err = ParseError;

    /// Parse `AAAA BBBB CCCC DDDD`. Tokens after the fourth block are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().take(4).collect();
        if tokens.len() < 4 {
            return Err(ParseError::BlockCount(tokens.len()));
        }

        let mut blocks = [0u16; 4];
        for (block, token) in blocks.iter_mut().zip(&tokens) {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            *block = u16::from_str_radix(digits, 16)
                .map_err(|_| ParseError::InvalidBlock((*token).to_string()))?;
        }

        Ok(Frame::new(blocks))
    }
}
