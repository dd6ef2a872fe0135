//! Group 5A: transparent data channels
//!
//! Block B addresses one of 32 channels; blocks C and D are its payload.

use crate::error::DecodeError;
use crate::group::{GroupHeader, GroupId};
use crate::GroupDecoder;

/// Number of transparent data channels
pub const TDC_CHANNELS: usize = 32;

/// Last payload received on each channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransparentDataDecoder {
    /// Last 5A header seen
    pub header: Option<GroupHeader>,
    /// Channel addressed by the last group
    pub channel: u8,
    /// Bit `n` set once channel `n` has carried data
    pub channels: u32,
    /// Blocks C and D per channel
    pub data: [[u16; 2]; TDC_CHANNELS],
}

impl TransparentDataDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload of a channel, if it has been received
    pub fn channel_data(&self, channel: u8) -> Option<[u16; 2]> {
        let index = usize::from(channel);
        (index < TDC_CHANNELS && self.channels & (1 << index) != 0).then(|| self.data[index])
    }

    /// Channels that have carried data, in ascending order
    pub fn active_channels(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..TDC_CHANNELS as u8).filter(move |ch| self.channels & (1 << ch) != 0)
    }
}

impl GroupDecoder for TransparentDataDecoder {
    const GROUP: GroupId = GroupId::TRANSPARENT_DATA;

    fn decode(&mut self, header: &GroupHeader) -> Result<(), DecodeError> {
        Self::expect_group(header)?;

        let channel = header.payload();
        self.header = Some(*header);
        self.channel = channel;
        self.channels |= 1 << channel;
        self.data[usize::from(channel)] = [header.block_c(), header.block_d()];
        Ok(())
    }

    fn header(&self) -> Option<&GroupHeader> {
        self.header.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_accumulate() {
        let mut dec = TransparentDataDecoder::new();
        dec.decode(&GroupHeader::from_blocks([0xC201, 0x5003, 0x1111, 0x2222]))
            .unwrap();
        dec.decode(&GroupHeader::from_blocks([0xC201, 0x501F, 0xAAAA, 0xBBBB]))
            .unwrap();

        assert_eq!(dec.channel, 31);
        assert_eq!(dec.channels, 0x8000_0008);
        assert_eq!(dec.channel_data(3), Some([0x1111, 0x2222]));
        assert_eq!(dec.channel_data(31), Some([0xAAAA, 0xBBBB]));
        assert_eq!(dec.channel_data(4), None);
        assert_eq!(dec.active_channels().collect::<Vec<_>>(), vec![3, 31]);
    }

    #[test]
    fn test_rejects_other_groups() {
        let mut dec = TransparentDataDecoder::new();
        let err = dec
            .decode(&GroupHeader::from_blocks([0xC201, 0x5803, 0, 0]))
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedGroup { .. }));
        assert_eq!(dec.channels, 0);
    }
}
