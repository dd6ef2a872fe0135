//! Group 3A: Open Data Application identification
//!
//! 3A announces which application uses which group type. Only the
//! identification itself is decoded; the application payloads are not,
//! except for RDS-TMC (Alert-C), whose 8A groups [`crate::tmc`] interprets
//! once this decoder has seen the matching announcement.

use crate::error::DecodeError;
use crate::group::{GroupHeader, GroupId, Version};
use crate::GroupDecoder;

/// Registered application id of RDS-TMC (Alert-C)
pub const ALERT_C_AID: u16 = 0xCD46;

/// Application group type code Alert-C is carried on (group 8)
pub const ALERT_C_GROUP_TYPE: u8 = 8;

/// Layout of the 16-bit application message, selected by its top 2 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum OdaMessage {
    /// Variant 0: Alert-C system information
    SystemInfo {
        /// Location table number
        location_table: u8,
        /// Alternative frequency indicator
        afi: bool,
        /// Transmission mode
        mode: bool,
        /// International scope
        international: bool,
        /// National scope
        national: bool,
        /// Regional scope
        regional: bool,
        /// Urban scope
        urban: bool,
    },
    /// Other variants: generic layout (Alert-C timing parameters)
    Variant {
        /// Variant code (1-3)
        variant: u8,
        /// Gap parameter
        gap: u8,
        /// Service identifier
        service_id: u8,
        /// Activity time
        activity_time: u8,
        /// Window time
        window_time: u8,
        /// Delay time
        delay_time: u8,
    },
}

impl OdaMessage {
    /// Split a message word into its layout
    pub fn from_word(msg: u16) -> Self {
        let variant = (msg >> 14) as u8;
        if variant == 0 {
            OdaMessage::SystemInfo {
                location_table: ((msg >> 6) & 0x3F) as u8,
                afi: msg & 0x20 != 0,
                mode: msg & 0x10 != 0,
                international: msg & 0x08 != 0,
                national: msg & 0x04 != 0,
                regional: msg & 0x02 != 0,
                urban: msg & 0x01 != 0,
            }
        } else {
            OdaMessage::Variant {
                variant,
                gap: ((msg >> 12) & 0x03) as u8,
                service_id: ((msg >> 6) & 0x3F) as u8,
                activity_time: ((msg >> 4) & 0x03) as u8,
                window_time: ((msg >> 2) & 0x03) as u8,
                delay_time: (msg & 0x03) as u8,
            }
        }
    }

    /// Variant code (top 2 bits of the message)
    pub fn variant(&self) -> u8 {
        match self {
            OdaMessage::SystemInfo { .. } => 0,
            OdaMessage::Variant { variant, .. } => *variant,
        }
    }
}

/// Last decoded 3A announcement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OpenDataDecoder {
    /// Last 3A header seen
    pub header: Option<GroupHeader>,
    /// Application group type code
    pub app_group_type: u8,
    /// Application group version
    pub app_version: Version,
    /// Raw message word (block C)
    pub message_word: u16,
    /// Decoded message layout
    pub message: Option<OdaMessage>,
    /// Application id (block D)
    pub aid: u16,
}

impl OpenDataDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Group the announced application is carried on
    pub fn app_group(&self) -> GroupId {
        GroupId::new(self.app_group_type, self.app_version)
    }

    /// The announcement registers Alert-C on group 8A
    pub fn is_alert_c(&self) -> bool {
        self.header.is_some()
            && self.app_group_type == ALERT_C_GROUP_TYPE
            && self.app_version == Version::A
            && self.aid == ALERT_C_AID
    }
}

impl GroupDecoder for OpenDataDecoder {
    const GROUP: GroupId = GroupId::OPEN_DATA;

    fn decode(&mut self, header: &GroupHeader) -> Result<(), DecodeError> {
        Self::expect_group(header)?;

        let b = header.block_b();
        self.header = Some(*header);
        self.app_group_type = ((b >> 1) & 0x0F) as u8;
        self.app_version = Version::from_bit(b & 0x01 != 0);
        self.message_word = header.block_c();
        self.message = Some(OdaMessage::from_word(self.message_word));
        self.aid = header.block_d();
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
    fn test_alert_c_announcement() {
        let mut dec = OpenDataDecoder::new();
        assert!(!dec.is_alert_c());

        // application on 8A, system info: LTN 5, N + R scope
        let msg = (5 << 6) | 0x04 | 0x02;
        dec.decode(&GroupHeader::from_blocks([0xC201, 0x3010, msg, ALERT_C_AID]))
            .unwrap();

        assert_eq!(dec.app_group(), GroupId::TRAFFIC);
        assert!(dec.is_alert_c());
        assert_eq!(
            dec.message,
            Some(OdaMessage::SystemInfo {
                location_table: 5,
                afi: false,
                mode: false,
                international: false,
                national: true,
                regional: true,
                urban: false,
            })
        );
    }

    #[test]
    fn test_variant_layout() {
        let msg: u16 = (1 << 14) | (2 << 12) | (7 << 6) | (1 << 4) | (2 << 2) | 3;
        let decoded = OdaMessage::from_word(msg);
        assert_eq!(decoded.variant(), 1);
        assert_eq!(
            decoded,
            OdaMessage::Variant {
                variant: 1,
                gap: 2,
                service_id: 7,
                activity_time: 1,
                window_time: 2,
                delay_time: 3,
            }
        );
    }

    #[test]
    fn test_other_application_is_not_alert_c() {
        let mut dec = OpenDataDecoder::new();
        // RT+ (AID 4BD7) on 11A
        dec.decode(&GroupHeader::from_blocks([0xC201, 0x3016, 0x0000, 0x4BD7]))
            .unwrap();
        assert_eq!(dec.app_group().to_string(), "11A");
        assert!(!dec.is_alert_c());

        // Alert-C AID but announced on 8B
        dec.decode(&GroupHeader::from_blocks([0xC201, 0x3011, 0x0000, ALERT_C_AID]))
            .unwrap();
        assert!(!dec.is_alert_c());
    }
}
