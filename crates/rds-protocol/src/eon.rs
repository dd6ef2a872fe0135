//! Group 14A: Enhanced Other Networks
//!
//! 14A describes a different station (the "other network", identified by
//! PI(ON) in block D). The variant code in block B selects what block C
//! carries. All accumulated fields belong to one PI(ON); when a group for a
//! different station arrives the record is cleared.

use tracing::{debug, trace};

use crate::error::DecodeError;
use crate::group::{GroupHeader, GroupId};
use crate::pi::ProgramId;
use crate::segment::SegmentedText;
use crate::GroupDecoder;

/// Number of mapped-frequency slots (variants 5-9)
pub const MAPPED_FREQUENCIES: usize = 5;

const VARIANT_AF: u8 = 4;
const VARIANT_LINKAGE: u8 = 12;
const VARIANT_PTY_TA: u8 = 13;
const VARIANT_PIN: u8 = 14;

/// Accumulated 14A state for one other network
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OtherNetworksDecoder {
    /// Last 14A header seen (kept across resets)
    pub header: Option<GroupHeader>,
    /// TP flag of the other network
    pub tp_on: bool,
    /// Variant code of the last group
    pub variant: u8,
    /// Raw block C of the last group
    pub info: u16,
    /// PI of the other network
    pub pi_on: u16,
    /// Bit `n` set once variant `n` has been received
    pub variants_seen: u16,
    /// Program Service name of the other network
    pub ps: SegmentedText<8>,
    /// Alternate frequency pair (variant 4), transmission order
    pub af: [u8; 2],
    /// Mapped frequencies (variants 5-9)
    pub mapped: [u16; MAPPED_FREQUENCIES],
    /// Linkage information (variant 12)
    pub linkage: u16,
    /// PTY and TA of the other network (variant 13)
    pub pty_ta: u16,
    /// Program-item number of the other network (variant 14)
    pub pin: u16,
}

impl OtherNetworksDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self {
            header: None,
            tp_on: false,
            variant: 0,
            info: 0,
            pi_on: 0,
            variants_seen: 0,
            ps: SegmentedText::new(2),
            af: [0; 2],
            mapped: [0; MAPPED_FREQUENCIES],
            linkage: 0,
            pty_ta: 0,
            pin: 0,
        }
    }

    /// Clear every field except the header
    pub fn reset(&mut self) {
        *self = Self {
            header: self.header,
            ..Self::new()
        };
    }

    /// PI of the other network
    pub fn other_pi(&self) -> ProgramId {
        ProgramId(self.pi_on)
    }

    /// Name of the other network is fully received
    pub fn has_name(&self) -> bool {
        self.ps.is_complete()
    }

    /// PTY of the other network, once variant 13 has been seen
    pub fn pty(&self) -> Option<u8> {
        self.seen(VARIANT_PTY_TA)
            .then_some(((self.pty_ta >> 11) & 0x1F) as u8)
    }

    /// TA of the other network, once variant 13 has been seen
    pub fn ta(&self) -> Option<bool> {
        self.seen(VARIANT_PTY_TA).then_some(self.pty_ta & 0x01 != 0)
    }

    /// Program item of the other network as (day, hour, minute), once variant 14 has been seen
    pub fn program_item(&self) -> Option<(u8, u8, u8)> {
        self.seen(VARIANT_PIN).then_some((
            (self.pin >> 11) as u8,
            ((self.pin >> 6) & 0x1F) as u8,
            (self.pin & 0x3F) as u8,
        ))
    }

    /// Variant `n` has been received since the last reset
    pub fn seen(&self, variant: u8) -> bool {
        self.variants_seen & (1 << (variant & 0x0F)) != 0
    }
}

impl Default for OtherNetworksDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupDecoder for OtherNetworksDecoder {
    const GROUP: GroupId = GroupId::OTHER_NETWORKS;

    fn decode(&mut self, header: &GroupHeader) -> Result<(), DecodeError> {
        Self::expect_group(header)?;

        let b = header.block_b();
        let c = header.block_c();
        let pi_on = header.block_d();

        if pi_on != self.pi_on {
            debug!(
                from = %ProgramId(self.pi_on),
                to = %ProgramId(pi_on),
                "EON network changed, resetting"
            );
            self.reset();
        }

        let variant = (b & 0x0F) as u8;
        self.header = Some(*header);
        self.tp_on = b & 0x10 != 0;
        self.variant = variant;
        self.info = c;
        self.pi_on = pi_on;
        self.variants_seen |= 1 << variant;

        match variant {
            0..=3 => {
                self.ps.write(usize::from(variant), &c.to_be_bytes());
            }
            VARIANT_AF => self.af = c.to_be_bytes(),
            5..=9 => self.mapped[usize::from(variant - 5)] = c,
            VARIANT_LINKAGE => self.linkage = c,
            VARIANT_PTY_TA => self.pty_ta = c,
            VARIANT_PIN => self.pin = c,
            _ => {}
        }

        trace!(variant, "14A decoded");
        Ok(())
    }

    fn header(&self) -> Option<&GroupHeader> {
        self.header.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_14a(variant: u8, info: u16, pi_on: u16) -> GroupHeader {
        GroupHeader::from_blocks([0xC201, 0xE010 | u16::from(variant), info, pi_on])
    }

    #[test]
    fn test_name_variants() {
        let mut dec = OtherNetworksDecoder::new();
        for (variant, pair) in [b"BB", b"C ", b"R2", b"  "].iter().enumerate() {
            dec.decode(&group_14a(variant as u8, u16::from_be_bytes(**pair), 0xC202))
                .unwrap();
        }

        assert!(dec.has_name());
        assert_eq!(dec.ps.text(), "BBC R2  ");
        assert_eq!(dec.variants_seen, 0x000F);
        assert!(dec.tp_on);
        assert_eq!(dec.other_pi(), ProgramId(0xC202));
    }

    #[test]
    fn test_variant_routing() {
        let mut dec = OtherNetworksDecoder::new();
        dec.decode(&group_14a(4, 0x1A2B, 0xC202)).unwrap();
        dec.decode(&group_14a(7, 0x0506, 0xC202)).unwrap();
        dec.decode(&group_14a(12, 0xBEEF, 0xC202)).unwrap();
        dec.decode(&group_14a(13, (10 << 11) | 1, 0xC202)).unwrap();
        dec.decode(&group_14a(14, 0x0ABC, 0xC202)).unwrap();

        assert_eq!(dec.af, [0x1A, 0x2B]);
        assert_eq!(dec.mapped, [0, 0, 0x0506, 0, 0]);
        assert_eq!(dec.linkage, 0xBEEF);
        assert_eq!(dec.pty(), Some(10));
        assert_eq!(dec.ta(), Some(true));
        assert_eq!(dec.pin, 0x0ABC);
        assert_eq!(dec.variants_seen, (1 << 4) | (1 << 7) | (1 << 12) | (1 << 13) | (1 << 14));
    }

    #[test]
    fn test_program_item() {
        let mut dec = OtherNetworksDecoder::new();
        assert_eq!(dec.program_item(), None);
        // day 17, 08:30
        dec.decode(&group_14a(14, (17 << 11) | (8 << 6) | 30, 0xC202)).unwrap();
        assert_eq!(dec.program_item(), Some((17, 8, 30)));
    }

    #[test]
    fn test_pty_unknown_until_seen() {
        let mut dec = OtherNetworksDecoder::new();
        dec.decode(&group_14a(0, 0x4142, 0xC202)).unwrap();
        assert_eq!(dec.pty(), None);
        assert_eq!(dec.ta(), None);
    }

    #[test]
    fn test_network_change_resets_all_but_header() {
        let mut dec = OtherNetworksDecoder::new();
        dec.decode(&group_14a(0, u16::from_be_bytes(*b"XY"), 0xC202))
            .unwrap();
        dec.decode(&group_14a(13, 5 << 11, 0xC202)).unwrap();
        dec.decode(&group_14a(4, 0x1020, 0xC202)).unwrap();

        // a different network, variant 11 carries nothing we store
        let header = group_14a(11, 0x0000, 0xC303);
        dec.decode(&header).unwrap();

        assert_eq!(dec.header, Some(header));
        assert_eq!(dec.pi_on, 0xC303);
        assert_eq!(dec.variants_seen, 1 << 11);
        assert_eq!(dec.ps.text(), "        ");
        assert_eq!(dec.ps.valid_mask(), 0);
        assert_eq!(dec.af, [0, 0]);
        assert_eq!(dec.pty_ta, 0);
        assert_eq!(dec.pty(), None);
    }

    #[test]
    fn test_explicit_reset_keeps_header() {
        let mut dec = OtherNetworksDecoder::new();
        let header = group_14a(12, 0x1111, 0xC202);
        dec.decode(&header).unwrap();
        dec.reset();

        assert_eq!(dec.header, Some(header));
        assert_eq!(dec.linkage, 0);
        assert_eq!(dec.pi_on, 0);
    }
}
