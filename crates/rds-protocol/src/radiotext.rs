//! Group 2A: radiotext
//!
//! A 64-character message sent four characters per group (two from block C,
//! two from block D) at a 4-bit segment address. Toggling the A/B flag tells
//! the receiver to clear its buffer. A carriage return ends the message
//! early: the text is complete once every segment up to and including the
//! one holding the return has arrived.

use tracing::{debug, trace};

use crate::error::DecodeError;
use crate::group::{GroupHeader, GroupId};
use crate::segment::{SegmentedText, CARRIAGE_RETURN, END_MARKER};
use crate::GroupDecoder;

/// Radiotext length in characters
pub const RADIOTEXT_LEN: usize = 64;

const TEXT_AB: u16 = 0x0010;

/// Accumulated 2A state
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RadiotextDecoder {
    /// Last 2A header seen
    pub header: Option<GroupHeader>,
    /// Current text A/B flag
    pub ab: bool,
    /// Segment address of the last group
    pub segment: u8,
    /// Reassembled text
    pub text: SegmentedText<RADIOTEXT_LEN>,
}

impl RadiotextDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self {
            header: None,
            ab: false,
            segment: 0,
            text: SegmentedText::new(4),
        }
    }

    /// All segments up to the end of the message have arrived
    pub fn is_complete(&self) -> bool {
        self.text.is_complete()
    }

    /// Segments received so far
    pub fn valid_mask(&self) -> u16 {
        self.text.valid_mask()
    }

    /// Pattern `valid_mask` must reach
    pub fn completion_mask(&self) -> u16 {
        self.text.completion_mask()
    }
}

impl Default for RadiotextDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupDecoder for RadiotextDecoder {
    const GROUP: GroupId = GroupId::RADIOTEXT;

    fn decode(&mut self, header: &GroupHeader) -> Result<(), DecodeError> {
        Self::expect_group(header)?;

        let b = header.block_b();
        let ab = b & TEXT_AB != 0;
        let segment = (b & 0x0F) as u8;

        if ab != self.ab {
            debug!(ab, "radiotext A/B flag toggled, clearing text");
            self.text.reset();
        }
        self.header = Some(*header);
        self.ab = ab;
        self.segment = segment;

        let [c0, c1] = header.block_c().to_be_bytes();
        let [d0, d1] = header.block_d().to_be_bytes();
        let mut chars = [c0, c1, d0, d1];

        let mut terminated = false;
        for ch in chars.iter_mut().filter(|ch| **ch == CARRIAGE_RETURN) {
            *ch = END_MARKER;
            terminated = true;
        }

        self.text.write(usize::from(segment), &chars);
        if terminated {
            self.text.truncate_at(usize::from(segment));
            debug!(
                segment,
                complete = self.text.completion_mask(),
                "radiotext end marker"
            );
        }

        trace!(segment, "2A decoded");
        Ok(())
    }

    fn header(&self) -> Option<&GroupHeader> {
        self.header.as_ref()
    }
}
