//! Per-session decoder state

use rds_protocol::{
    BasicTuningDecoder, ClockTimeDecoder, DecodeError, GroupDecoder, GroupHeader, GroupMask,
    OpenDataDecoder, OtherNetworksDecoder, ProgramTypeNameDecoder, RadiotextDecoder,
    SlowLabelingDecoder, TrafficDecoder, TransparentDataDecoder, Version,
};
use serde::Serialize;
use tracing::trace;

/// Every group decoder of one session
///
/// The set owns all accumulators so that 8A can read the current 3A state
/// when it is decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecoderSet {
    /// 0A
    pub basic: BasicTuningDecoder,
    /// 1A
    pub slow_label: SlowLabelingDecoder,
    /// 2A
    pub radiotext: RadiotextDecoder,
    /// 3A
    pub oda: OpenDataDecoder,
    /// 4A
    pub clock: ClockTimeDecoder,
    /// 5A
    pub transparent: TransparentDataDecoder,
    /// 8A
    pub traffic: TrafficDecoder,
    /// 10A
    pub ptyn: ProgramTypeNameDecoder,
    /// 14A
    pub eon: OtherNetworksDecoder,
}

impl DecoderSet {
    /// Create a set of empty decoders
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a group to its decoder
    ///
    /// Returns `Ok(false)` for groups no decoder handles (every B version
    /// and the unsupported A types).
    pub fn dispatch(&mut self, header: &GroupHeader) -> Result<bool, DecodeError> {
        if header.version != Version::A {
            return Ok(false);
        }

        match header.group_type {
            0 => self.basic.decode(header)?,
            1 => self.slow_label.decode(header)?,
            2 => self.radiotext.decode(header)?,
            3 => self.oda.decode(header)?,
            4 => self.clock.decode(header)?,
            5 => self.transparent.decode(header)?,
            8 => self.traffic.decode(header, &self.oda)?,
            10 => self.ptyn.decode(header)?,
            14 => self.eon.decode(header)?,
            _ => {
                trace!(group = %header.group(), "no decoder for group");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Program Service name is fully received
    pub fn program_service_complete(&self) -> bool {
        self.basic.is_complete()
    }

    /// Radiotext is fully received
    pub fn radiotext_complete(&self) -> bool {
        self.radiotext.is_complete()
    }
}

/// Which group types and versions have been observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    /// Every group type seen, either version
    pub seen: GroupMask,
    /// Group types seen as version A
    pub seen_a: GroupMask,
    /// Group types seen as version B
    pub seen_b: GroupMask,
    /// Count per group, indexed by `group_type * 2 + version`
    pub counts: [u32; 32],
}

impl GroupStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one received group
    pub fn record(&mut self, header: &GroupHeader) {
        self.seen.insert(header.group_type);
        match header.version {
            Version::A => self.seen_a.insert(header.group_type),
            Version::B => self.seen_b.insert(header.group_type),
        }
        let index = Self::index(header.group_type, header.version);
        self.counts[index] = self.counts[index].saturating_add(1);
    }

    /// Number of groups received for a type and version
    pub fn count(&self, group_type: u8, version: Version) -> u32 {
        self.counts[Self::index(group_type, version)]
    }

    /// Total number of groups received
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    fn index(group_type: u8, version: Version) -> usize {
        usize::from(group_type & 0x0F) * 2 + usize::from(version == Version::B)
    }
}
