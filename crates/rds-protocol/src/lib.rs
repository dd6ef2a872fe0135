//! RDS Protocol Library
//!
//! This crate decodes the Radio Data System (RDS/RBDS) groups broadcast on
//! the 57 kHz FM subcarrier:
//!
//! - **0A**: Program Service name, TA/MS flags, decoder identification, AF list
//! - **1A**: program-item number and slow labeling codes
//! - **2A**: 64-character radiotext
//! - **3A**: Open Data Application identification
//! - **4A**: clock-time and date (Modified Julian Day)
//! - **5A**: transparent data channels
//! - **8A**: Traffic Message Channel (Alert-C when announced by 3A)
//! - **10A**: program type name
//! - **14A**: Enhanced Other Networks
//!
//! # Architecture
//!
//! A [`Frame`] is classified into a [`GroupHeader`] from block B. Each group
//! type has its own stateful decoder that accumulates fields across groups.
//! Text fields arrive a few characters per group and are reassembled by
//! [`SegmentedText`], which tracks a validity mask per segment.
//!
//! # Example
//!
//! ```rust
//! use rds_protocol::{BasicTuningDecoder, Frame, GroupDecoder, GroupHeader};
//!
//! let mut decoder = BasicTuningDecoder::new();
//! for (segment, chars) in [b"BB", b"C ", b"R1", b"  "].iter().enumerate() {
//!     let b = segment as u16;
//!     let d = u16::from_be_bytes(**chars);
//!     let frame = Frame::new([0xC201, b, 0xE0E0, d]);
//!     decoder.decode(&GroupHeader::classify(&frame)).unwrap();
//! }
//!
//! assert!(decoder.is_complete());
//! assert_eq!(decoder.ps.text(), "BBC R1  ");
//! ```

pub mod basic;
pub mod calendar;
pub mod clock;
pub mod eon;
pub mod error;
pub mod frame;
pub mod group;
pub mod oda;
pub mod pi;
pub mod pty;
pub mod ptyn;
pub mod radiotext;
pub mod segment;
pub mod slow_label;
pub mod tmc;
pub mod transparent;

pub use basic::BasicTuningDecoder;
pub use calendar::{mjd_to_date, CalendarDate};
pub use clock::{ClockTime, ClockTimeDecoder, LocalTime};
pub use eon::OtherNetworksDecoder;
pub use error::{DecodeError, ParseError};
pub use frame::{BlockError, BlockErrors, Frame};
pub use group::{group_name, GroupHeader, GroupId, GroupMask, Version};
pub use oda::{OdaMessage, OpenDataDecoder};
pub use pi::{Coverage, ProgramId};
pub use pty::{pty_name, PtyTable};
pub use ptyn::ProgramTypeNameDecoder;
pub use radiotext::RadiotextDecoder;
pub use segment::SegmentedText;
pub use slow_label::SlowLabelingDecoder;
pub use tmc::{AlertCBody, TrafficDecoder, TrafficMessage};
pub use transparent::TransparentDataDecoder;

/// A stateful decoder for one group type
///
/// Decoders accumulate fields across every group of their type that they
/// are given. Headers for any other group are rejected without touching
/// state.
pub trait GroupDecoder {
    /// The group this decoder accepts
    const GROUP: GroupId;

    /// Fold one group into the accumulated state
    fn decode(&mut self, header: &GroupHeader) -> Result<(), DecodeError>;

    /// Header of the last group decoded, if any
    fn header(&self) -> Option<&GroupHeader>;

    /// Reject headers for any group other than [`Self::GROUP`]
    fn expect_group(header: &GroupHeader) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        check_group(Self::GROUP, header)
    }
}

pub(crate) fn check_group(expected: GroupId, header: &GroupHeader) -> Result<(), DecodeError> {
    let actual = header.group();
    if actual == expected {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedGroup { expected, actual })
    }
}
