//! Group 10A: program type name
//!
//! An 8-character refinement of the PTY code, sent as two 4-character
//! segments. Like radiotext, toggling the A/B flag clears the buffer.

use tracing::debug;

use crate::error::DecodeError;
use crate::group::{GroupHeader, GroupId};
use crate::segment::SegmentedText;
use crate::GroupDecoder;

const NAME_AB: u16 = 0x0010;

/// Accumulated 10A state
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProgramTypeNameDecoder {
    /// Last 10A header seen
    pub header: Option<GroupHeader>,
    /// Current A/B flag
    pub ab: bool,
    /// Segment address of the last group
    pub segment: u8,
    /// Program type name
    pub name: SegmentedText<8>,
}

impl ProgramTypeNameDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self {
            header: None,
            ab: false,
            segment: 0,
            name: SegmentedText::new(4),
        }
    }

    /// Both halves of the name have arrived
    pub fn is_complete(&self) -> bool {
        self.name.is_complete()
    }
}

impl Default for ProgramTypeNameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupDecoder for ProgramTypeNameDecoder {
    const GROUP: GroupId = GroupId::PROGRAM_TYPE_NAME;

    fn decode(&mut self, header: &GroupHeader) -> Result<(), DecodeError> {
        Self::expect_group(header)?;

        let b = header.block_b();
        let ab = b & NAME_AB != 0;
        let segment = (b & 0x01) as u8;

        if ab != self.ab {
            debug!(ab, "PTYN A/B flag toggled, clearing name");
            self.name.reset();
        }
        self.header = Some(*header);
        self.ab = ab;
        self.segment = segment;

        let [c0, c1] = header.block_c().to_be_bytes();
        let [d0, d1] = header.block_d().to_be_bytes();
        self.name.write(usize::from(segment), &[c0, c1, d0, d1]);
        Ok(())
    }

    fn header(&self) -> Option<&GroupHeader> {
        self.header.as_ref()
    }
}
