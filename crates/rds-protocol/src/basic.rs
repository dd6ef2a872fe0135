//! Group 0A: basic tuning and switching information
//!
//! Each 0A group carries two characters of the 8-character Program Service
//! name, one bit of the Decoder Identification code, the TA and M/S flags,
//! and two Alternate Frequency codes.
//!
//! # Block layout
//! - B bit 4: Traffic Announcement
//! - B bit 3: Music (1) / Speech (0)
//! - B bit 2: Decoder Identification bit for this segment
//! - B bits 1-0: segment address
//! - C: two AF codes, high byte first
//! - D: two PS characters, high byte first

use tracing::{debug, trace};

use crate::error::DecodeError;
use crate::group::{GroupHeader, GroupId};
use crate::segment::SegmentedText;
use crate::GroupDecoder;

/// Maximum number of alternate frequencies tracked
pub const AF_SLOTS: usize = 25;

/// AF filler code announcing that an LF/MF frequency follows
pub const AF_LF_MF_FOLLOWS: u8 = 250;

const TA: u16 = 0x0010;
const MS: u16 = 0x0008;
const DI: u16 = 0x0004;

/// Convert a VHF alternate frequency code to kHz
pub fn af_code_to_khz(code: u8) -> Option<u32> {
    match code {
        1..=204 => Some(87_500 + u32::from(code) * 100),
        _ => None,
    }
}

/// Accumulated 0A state
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BasicTuningDecoder {
    /// Last 0A header seen
    pub header: Option<GroupHeader>,
    /// Traffic Announcement flag
    pub traffic_announcement: bool,
    /// Music (true) or speech (false)
    pub music: bool,
    /// Decoder Identification bits, bit `3 - segment` per segment
    pub decoder_id: u8,
    /// Segment address of the last group
    pub segment: u8,
    /// Program Service name
    pub ps: SegmentedText<8>,
    /// Number of alternate frequencies announced by the last count code
    pub af_count: u8,
    /// Alternate frequency codes, zero-terminated
    pub af: [u8; AF_SLOTS],
}

impl BasicTuningDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self {
            header: None,
            traffic_announcement: false,
            music: false,
            decoder_id: 0,
            segment: 0,
            ps: SegmentedText::new(2),
            af_count: 0,
            af: [0; AF_SLOTS],
        }
    }

    /// Program Service name is fully received
    pub fn is_complete(&self) -> bool {
        self.ps.is_complete()
    }

    /// Add a pair of AF codes as carried in block C
    pub fn add_af_pair(&mut self, codes: [u8; 2]) {
        if codes[1] == AF_LF_MF_FOLLOWS {
            return;
        }

        for code in codes {
            match code {
                225..=249 => {
                    self.af_count = code - 224;
                    self.af = [0; AF_SLOTS];
                    debug!("AF list reset, {} frequencies follow", self.af_count);
                }
                1..=204 => self.insert_af(code),
                _ => {}
            }
        }
    }

    fn insert_af(&mut self, code: u8) {
        if self.af.contains(&code) {
            return;
        }
        if let Some(slot) = self.af.iter_mut().find(|slot| **slot == 0) {
            *slot = code;
        }
    }

    /// Alternate frequency codes received so far
    pub fn alternate_frequencies(&self) -> impl Iterator<Item = u8> + '_ {
        self.af.iter().copied().take_while(|code| *code != 0)
    }

    /// Alternate frequencies in kHz
    pub fn alternate_frequencies_khz(&self) -> Vec<u32> {
        self.alternate_frequencies()
            .filter_map(af_code_to_khz)
            .collect()
    }

    /// DI d0: stereo
    pub fn stereo(&self) -> bool {
        self.decoder_id & 0x01 != 0
    }

    /// DI d1: artificial head recording
    pub fn artificial_head(&self) -> bool {
        self.decoder_id & 0x02 != 0
    }

    /// DI d2: compressed
    pub fn compressed(&self) -> bool {
        self.decoder_id & 0x04 != 0
    }

    /// DI d3: PTY is switched dynamically
    pub fn dynamic_pty(&self) -> bool {
        self.decoder_id & 0x08 != 0
    }
}

impl Default for BasicTuningDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupDecoder for BasicTuningDecoder {
    const GROUP: GroupId = GroupId::BASIC_TUNING;

    fn decode(&mut self, header: &GroupHeader) -> Result<(), DecodeError> {
        Self::expect_group(header)?;

        let b = header.block_b();
        let segment = (b & 0x03) as u8;
        let di_bit = 1u8 << (3 - segment);

        self.header = Some(*header);
        self.traffic_announcement = b & TA != 0;
        self.music = b & MS != 0;
        if b & DI != 0 {
            self.decoder_id |= di_bit;
        } else {
            self.decoder_id &= !di_bit;
        }
        self.segment = segment;

        self.add_af_pair(header.block_c().to_be_bytes());
        self.ps
            .write(usize::from(segment), &header.block_d().to_be_bytes());

        trace!(segment, ps = %self.ps, "0A decoded");
        Ok(())
    }

    fn header(&self) -> Option<&GroupHeader> {
        self.header.as_ref()
    }
}
