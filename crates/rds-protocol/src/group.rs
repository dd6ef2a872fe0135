//! Group classification
//!
//! Block B of every group carries the same header fields regardless of the
//! group type:
//!
//! ```text
//! 15 14 13 12 | 11 | 10 | 9 8 7 6 5 | 4 3 2 1 0
//!  group type | B0 | TP |    PTY    |  payload
//! ```
//!
//! Any 16-bit value decodes to a valid header, so classification cannot fail.

use std::fmt;

use crate::frame::{Frame, BLOCK_A, BLOCK_B, BLOCK_C, BLOCK_D};
use crate::pi::ProgramId;

/// Group version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Version {
    /// Version A: block C carries payload
    #[default]
    A,
    /// Version B: block C repeats the PI code
    B,
}

impl Version {
    /// Version from the B0 bit
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Version::B
        } else {
            Version::A
        }
    }

    /// Letter used in group names
    pub fn letter(&self) -> char {
        match self {
            Version::A => 'A',
            Version::B => 'B',
        }
    }
}

/// Group type and version, e.g. `02A`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupId {
    /// Group type code (0-15)
    pub group_type: u8,
    /// Version
    pub version: Version,
}

impl GroupId {
    /// 0A: basic tuning and switching information
    pub const BASIC_TUNING: GroupId = GroupId::a(0);
    /// 1A: program-item number and slow labeling codes
    pub const SLOW_LABELING: GroupId = GroupId::a(1);
    /// 2A: radiotext
    pub const RADIOTEXT: GroupId = GroupId::a(2);
    /// 3A: open data application identification
    pub const OPEN_DATA: GroupId = GroupId::a(3);
    /// 4A: clock-time and date
    pub const CLOCK_TIME: GroupId = GroupId::a(4);
    /// 5A: transparent data channels
    pub const TRANSPARENT_DATA: GroupId = GroupId::a(5);
    /// 8A: traffic message channel
    pub const TRAFFIC: GroupId = GroupId::a(8);
    /// 10A: program type name
    pub const PROGRAM_TYPE_NAME: GroupId = GroupId::a(10);
    /// 14A: enhanced other networks
    pub const OTHER_NETWORKS: GroupId = GroupId::a(14);

    /// Create a group id
    pub const fn new(group_type: u8, version: Version) -> Self {
        Self {
            group_type: group_type & 0x0F,
            version,
        }
    }

    const fn a(group_type: u8) -> Self {
        Self::new(group_type, Version::A)
    }

    /// Human-readable description from the RBDS group table
    pub fn name(&self) -> &'static str {
        group_name(self.group_type, self.version)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{}", self.group_type, self.version.letter())
    }
}

/// Group type usage, indexed by `group_type * 2 + version`
static GROUP_NAMES: [&str; 32] = [
    "Basic tuning and switching information",
    "Basic tuning and switching information",
    "Program-item number and slow labeling codes",
    "Program-item number and slow labeling codes",
    "Radiotext",
    "Radiotext",
    "Applications Identification for Open Data",
    "Open data application",
    "Clock-time and date",
    "Open data application",
    "Transparent data channels or ODA",
    "Transparent data channels or ODA",
    "In house applications or ODA",
    "In house applications or ODA",
    "Radio paging or ODA",
    "Open data application",
    "Traffic Message Channel or ODA",
    "Traffic Message Channel or ODA",
    "Emergency warning systems or ODA",
    "Emergency warning systems or ODA",
    "Program Type Name",
    "Open data application",
    "Open data application",
    "Open data application",
    "Open data application",
    "Open data application",
    "Enhanced Radio paging or ODA",
    "Open data application",
    "Enhanced Other Networks information",
    "Enhanced Other Networks information",
    "Fast basic tuning and switching information (phased out)",
    "Fast tuning and switching information",
];

/// Look up the description of a group type/version
pub fn group_name(group_type: u8, version: Version) -> &'static str {
    let index = usize::from(group_type & 0x0F) * 2 + usize::from(version == Version::B);
    GROUP_NAMES[index]
}

/// Header fields common to every group, plus the raw blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupHeader {
    /// Group type code (0-15)
    pub group_type: u8,
    /// Group version
    pub version: Version,
    /// Traffic Program flag
    pub traffic_program: bool,
    /// Program type code (0-31)
    pub program_type: u8,
    /// Raw blocks A, B, C, D
    pub blocks: [u16; 4],
}

impl GroupHeader {
    /// Classify a frame by its block B
    pub fn classify(frame: &Frame) -> Self {
        Self::from_blocks(frame.blocks)
    }

    /// Build a header from raw blocks
    pub fn from_blocks(blocks: [u16; 4]) -> Self {
        let b = blocks[BLOCK_B];
        Self {
            group_type: ((b >> 12) & 0x0F) as u8,
            version: Version::from_bit(b & 0x0800 != 0),
            traffic_program: b & 0x0400 != 0,
            program_type: ((b >> 5) & 0x1F) as u8,
            blocks,
        }
    }

    /// Group id (type and version)
    pub fn group(&self) -> GroupId {
        GroupId::new(self.group_type, self.version)
    }

    /// Program Identification from block A
    pub fn pi(&self) -> ProgramId {
        ProgramId(self.blocks[BLOCK_A])
    }

    /// Group-specific low 5 bits of block B
    pub fn payload(&self) -> u8 {
        (self.blocks[BLOCK_B] & 0x1F) as u8
    }

    /// Raw block B
    pub fn block_b(&self) -> u16 {
        self.blocks[BLOCK_B]
    }

    /// Raw block C
    pub fn block_c(&self) -> u16 {
        self.blocks[BLOCK_C]
    }

    /// Raw block D
    pub fn block_d(&self) -> u16 {
        self.blocks[BLOCK_D]
    }
}

impl fmt::Display for GroupHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.blocks;
        write!(
            f,
            "{:04X} {:04X} {:04X} {:04X} | GT {} PTY {:2} TP {}",
            a,
            b,
            c,
            d,
            self.group(),
            self.program_type,
            u8::from(self.traffic_program)
        )
    }
}

/// Set of group types (bit `n` = group type `n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct GroupMask(pub u16);

impl GroupMask {
    /// No group types
    pub const EMPTY: GroupMask = GroupMask(0);
    /// Every group type
    pub const ALL: GroupMask = GroupMask(0xFFFF);

    /// Mask containing a single group type
    pub fn of(group_type: u8) -> Self {
        GroupMask(1 << (group_type & 0x0F))
    }

    /// Add a group type
    pub fn insert(&mut self, group_type: u8) {
        self.0 |= 1 << (group_type & 0x0F);
    }

    /// Check whether a group type is in the set
    pub fn contains(&self, group_type: u8) -> bool {
        self.0 & (1 << (group_type & 0x0F)) != 0
    }

    /// Raw bits
    pub fn bits(&self) -> u16 {
        self.0
    }

    /// True if no group type is set
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Intersection of two masks
    pub fn intersect(&self, other: GroupMask) -> GroupMask {
        GroupMask(self.0 & other.0)
    }

    /// Group types in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..16).filter(move |gt| self.contains(*gt))
    }
}

impl fmt::Display for GroupMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_basic_tuning() {
        // 0A, TP set, PTY 1, segment 2
        let header = GroupHeader::from_blocks([0xC201, 0x0422, 0xE20D, 0x4242]);
        assert_eq!(header.group_type, 0);
        assert_eq!(header.version, Version::A);
        assert!(header.traffic_program);
        assert_eq!(header.program_type, 1);
        assert_eq!(header.payload(), 0x02);
        assert_eq!(header.group(), GroupId::BASIC_TUNING);
    }

    #[test]
    fn test_classify_version_b() {
        let header = GroupHeader::from_blocks([0x1234, 0xF800, 0x1234, 0x0000]);
        assert_eq!(header.group_type, 15);
        assert_eq!(header.version, Version::B);
        assert_eq!(header.group().to_string(), "15B");
    }

    #[test]
    fn test_group_names() {
        assert_eq!(group_name(2, Version::A), "Radiotext");
        assert_eq!(group_name(3, Version::B), "Open data application");
        assert_eq!(GroupId::OTHER_NETWORKS.name(), "Enhanced Other Networks information");
        assert_eq!(
            group_name(15, Version::B),
            "Fast tuning and switching information"
        );
    }

    #[test]
    fn test_group_id_display() {
        assert_eq!(GroupId::RADIOTEXT.to_string(), "02A");
        assert_eq!(GroupId::OTHER_NETWORKS.to_string(), "14A");
    }

    #[test]
    fn test_group_mask() {
        let mut mask = GroupMask::EMPTY;
        mask.insert(0);
        mask.insert(2);
        mask.insert(14);
        assert!(mask.contains(2));
        assert!(!mask.contains(3));
        assert_eq!(mask.bits(), 0x4005);
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![0, 2, 14]);
        assert_eq!(mask.intersect(GroupMask::of(14)), GroupMask(0x4000));
        assert_eq!(mask.to_string(), "4005");
    }

    proptest! {
        #[test]
        fn classify_extracts_every_field(b: u16) {
            let header = GroupHeader::from_blocks([0, b, 0, 0]);
            prop_assert_eq!(u16::from(header.group_type), b >> 12);
            prop_assert_eq!(header.version == Version::B, b & 0x0800 != 0);
            prop_assert_eq!(header.traffic_program, b & 0x0400 != 0);
            prop_assert_eq!(u16::from(header.program_type), (b >> 5) & 0x1F);
            prop_assert_eq!(u16::from(header.payload()), b & 0x1F);
        }
    }
}
