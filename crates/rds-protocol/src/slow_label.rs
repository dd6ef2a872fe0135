//! Group 1A: program-item number and slow labeling codes
//!
//! Every field is overwritten by each group; nothing accumulates.

use crate::error::DecodeError;
use crate::group::{GroupHeader, GroupId};
use crate::GroupDecoder;

/// Decoded 1A fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SlowLabelingDecoder {
    /// Last 1A header seen
    pub header: Option<GroupHeader>,
    /// Radio paging codes (B bits 4-0)
    pub paging_code: u8,
    /// Linkage actuator (C bit 15)
    pub linkage_actuator: bool,
    /// Variant code (C bits 14-12)
    pub variant: u8,
    /// Slow labeling code (C bits 11-0)
    pub slow_label: u16,
    /// Program-item number notification (D bits 11-0)
    pub program_item: u16,
}

impl SlowLabelingDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduled hour of the program item
    pub fn item_hour(&self) -> u8 {
        ((self.program_item >> 6) & 0x1F) as u8
    }

    /// Scheduled minute of the program item
    pub fn item_minute(&self) -> u8 {
        (self.program_item & 0x3F) as u8
    }

    /// Extended country code, carried by variant 0
    pub fn extended_country_code(&self) -> Option<u8> {
        (self.variant == 0).then_some((self.slow_label & 0xFF) as u8)
    }
}

impl GroupDecoder for SlowLabelingDecoder {
    const GROUP: GroupId = GroupId::SLOW_LABELING;

    fn decode(&mut self, header: &GroupHeader) -> Result<(), DecodeError> {
        Self::expect_group(header)?;

        let c = header.block_c();
        self.header = Some(*header);
        self.paging_code = header.payload();
        self.linkage_actuator = c & 0x8000 != 0;
        self.variant = ((c >> 12) & 0x07) as u8;
        self.slow_label = c & 0x0FFF;
        self.program_item = header.block_d() & 0x0FFF;
        Ok(())
    }

    fn header(&self) -> Option<&GroupHeader> {
        self.header.as_ref()
    }
}
