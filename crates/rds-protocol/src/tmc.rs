//! Group 8A: Traffic Message Channel
//!
//! 8A is only meaningful once a 3A group has announced which application
//! it carries. When the announcement registers RDS-TMC on 8A, the group is
//! read with the Alert-C layout; otherwise only the generic fields are kept.
//! The caller passes the current 3A state in explicitly.
//!
//! # Alert-C single-group layout
//! - B bit 4: tuning information (T)
//! - B bit 3: single-group message (F)
//! - B bits 2-0: duration and persistence (DP)
//! - C bit 15: diversion advice
//! - C bit 14: direction
//! - C bits 13-11: extent
//! - C bits 10-0: event code
//! - D: location code

use tracing::trace;

use crate::error::DecodeError;
use crate::group::{GroupHeader, GroupId};
use crate::oda::OpenDataDecoder;

/// Payload of an Alert-C group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AlertCBody {
    /// Complete message in one group
    Single {
        /// Diversion advice
        diversion: bool,
        /// Negative direction
        direction: bool,
        /// Extent
        extent: u8,
        /// Event code
        event: u16,
        /// Location code
        location: u16,
    },
    /// Part of a multi-group message
    Multi {
        /// Raw block C
        y: u16,
        /// Raw block D
        location: u16,
    },
    /// Tuning information (service provider name, other networks)
    Tuning {
        /// Tuning variant (B bits 3-0)
        variant: u8,
        /// Raw block C
        c: u16,
        /// Raw block D
        d: u16,
    },
}

/// Interpretation of the last 8A group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TrafficMessage {
    /// RDS-TMC message
    AlertC {
        /// Tuning information flag
        tuning: bool,
        /// Single-group message flag
        single_group: bool,
        /// Duration and persistence
        duration: u8,
        /// Message contents
        body: AlertCBody,
    },
    /// No Alert-C announcement seen: raw fields only
    Generic {
        /// B bit 4
        x4: bool,
        /// Variant (B bits 3-0)
        variant: u8,
        /// Raw block C
        c: u16,
        /// Raw block D
        d: u16,
    },
}

impl TrafficMessage {
    /// Decode with the Alert-C layout
    pub fn alert_c(b: u16, c: u16, d: u16) -> Self {
        let tuning = b & 0x10 != 0;
        let single_group = b & 0x08 != 0;

        let body = if tuning {
            AlertCBody::Tuning {
                variant: (b & 0x0F) as u8,
                c,
                d,
            }
        } else if single_group {
            AlertCBody::Single {
                diversion: c & 0x8000 != 0,
                direction: c & 0x4000 != 0,
                extent: ((c >> 11) & 0x07) as u8,
                event: c & 0x07FF,
                location: d,
            }
        } else {
            AlertCBody::Multi { y: c, location: d }
        };

        TrafficMessage::AlertC {
            tuning,
            single_group,
            duration: (b & 0x07) as u8,
            body,
        }
    }

    /// Keep the generic fields only
    pub fn generic(b: u16, c: u16, d: u16) -> Self {
        TrafficMessage::Generic {
            x4: b & 0x10 != 0,
            variant: (b & 0x0F) as u8,
            c,
            d,
        }
    }

    /// Message was read with the Alert-C layout
    pub fn is_alert_c(&self) -> bool {
        matches!(self, TrafficMessage::AlertC { .. })
    }
}

/// Accumulated 8A state
///
/// The raw bit fields are always extracted; `message` holds the
/// interpretation chosen from the 3A state at decode time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrafficDecoder {
    /// Last 8A header seen
    pub header: Option<GroupHeader>,
    /// B bit 4
    pub x4: bool,
    /// B bits 3-0
    pub variant: u8,
    /// B bit 3
    pub x3: bool,
    /// B bit 2
    pub x2: bool,
    /// Raw block C
    pub y: u16,
    /// C bit 15
    pub diversion: bool,
    /// C bit 14
    pub direction: bool,
    /// C bits 13-11
    pub extent: u8,
    /// C bits 10-0
    pub event: u16,
    /// Block D
    pub location: u16,
    /// Interpretation of the last group
    pub message: Option<TrafficMessage>,
}

impl TrafficDecoder {
    /// Group this decoder accepts
    pub const GROUP: GroupId = GroupId::TRAFFIC;

    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an 8A group in the context of the current 3A announcement
    pub fn decode(
        &mut self,
        header: &GroupHeader,
        oda: &OpenDataDecoder,
    ) -> Result<(), DecodeError> {
        crate::check_group(Self::GROUP, header)?;

        let b = header.block_b();
        let c = header.block_c();
        let d = header.block_d();

        self.header = Some(*header);
        self.x4 = b & 0x10 != 0;
        self.variant = (b & 0x0F) as u8;
        self.x3 = b & 0x08 != 0;
        self.x2 = b & 0x04 != 0;
        self.y = c;
        self.diversion = c & 0x8000 != 0;
        self.direction = c & 0x4000 != 0;
        self.extent = ((c >> 11) & 0x07) as u8;
        self.event = c & 0x07FF;
        self.location = d;

        let message = if oda.is_alert_c() {
            TrafficMessage::alert_c(b, c, d)
        } else {
            TrafficMessage::generic(b, c, d)
        };
        trace!(alert_c = message.is_alert_c(), "8A decoded");
        self.message = Some(message);
        Ok(())
    }

    /// Last group header seen
    pub fn header(&self) -> Option<&GroupHeader> {
        self.header.as_ref()
    }
}
