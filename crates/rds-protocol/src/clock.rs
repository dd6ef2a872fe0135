//! Group 4A: clock-time and date
//!
//! # Block layout
//! - B bits 1-0: MJD bits 16-15
//! - C bits 15-1: MJD bits 14-0
//! - C bit 0: UTC hour bit 4
//! - D bits 15-12: UTC hour bits 3-0
//! - D bits 11-6: UTC minute
//! - D bit 5: local offset sign (1 = negative)
//! - D bits 4-0: local offset in half hours

use std::fmt;

use tracing::warn;

use crate::calendar::{mjd_to_date, weekday, CalendarDate};
use crate::error::DecodeError;
use crate::group::{GroupHeader, GroupId};
use crate::GroupDecoder;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// UTC time and date with the broadcaster's local offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClockTime {
    /// Modified Julian Day
    pub mjd: u32,
    /// Calendar date (UTC)
    pub date: CalendarDate,
    /// ISO weekday (1 = Monday)
    pub weekday: u8,
    /// UTC hour
    pub hour: u8,
    /// UTC minute
    pub minute: u8,
    /// Local offset is west of UTC
    pub offset_negative: bool,
    /// Local offset magnitude in half hours
    pub offset_half_hours: u8,
}

/// Local date and time derived from a [`ClockTime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LocalTime {
    /// Local calendar date
    pub date: CalendarDate,
    /// Local hour
    pub hour: u8,
    /// Local minute
    pub minute: u8,
}

impl ClockTime {
    /// Decode the clock fields of a 4A group
    pub fn from_blocks(b: u16, c: u16, d: u16) -> Result<Self, DecodeError> {
        let hour = (((d >> 12) & 0x0F) | ((c & 0x01) << 4)) as u8;
        let minute = ((d >> 6) & 0x3F) as u8;
        if hour > 23 || minute > 59 {
            return Err(DecodeError::InvalidClock { hour, minute });
        }

        let mjd = u32::from(c >> 1) | (u32::from(b & 0x03) << 15);
        Ok(ClockTime {
            mjd,
            date: mjd_to_date(mjd),
            weekday: weekday(mjd),
            hour,
            minute,
            offset_negative: d & 0x20 != 0,
            offset_half_hours: (d & 0x1F) as u8,
        })
    }

    /// Whole hours of the local offset
    pub fn tz_hours(&self) -> u8 {
        self.offset_half_hours >> 1
    }

    /// Local offset has an extra half hour
    pub fn tz_half(&self) -> bool {
        self.offset_half_hours & 0x01 != 0
    }

    /// Signed local offset in minutes
    pub fn utc_offset_minutes(&self) -> i32 {
        let minutes = i32::from(self.offset_half_hours) * 30;
        if self.offset_negative {
            -minutes
        } else {
            minutes
        }
    }

    /// Broadcaster reports UTC with no local offset
    pub fn is_utc(&self) -> bool {
        self.offset_half_hours == 0
    }

    /// Local date and time, rolling the date over when the offset crosses midnight
    pub fn local(&self) -> LocalTime {
        let minutes = i64::from(self.hour) * 60
            + i64::from(self.minute)
            + i64::from(self.utc_offset_minutes());
        let day_shift = minutes.div_euclid(MINUTES_PER_DAY);
        let minutes = minutes.rem_euclid(MINUTES_PER_DAY);
        let mjd = (i64::from(self.mjd) + day_shift).max(0) as u32;

        LocalTime {
            date: mjd_to_date(mjd),
            hour: (minutes / 60) as u8,
            minute: (minutes % 60) as u8,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:{:02}", self.date, self.hour, self.minute)?;
        if self.is_utc() {
            write!(f, " UTC")
        } else {
            write!(
                f,
                " UTC{}{:02}:{:02}",
                if self.offset_negative { '-' } else { '+' },
                self.tz_hours(),
                if self.tz_half() { 30 } else { 0 }
            )
        }
    }
}

impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:{:02}", self.date, self.hour, self.minute)
    }
}

/// Accumulated 4A state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClockTimeDecoder {
    /// Last 4A header seen
    pub header: Option<GroupHeader>,
    /// Last valid clock time
    pub time: Option<ClockTime>,
    /// Number of groups rejected for out-of-range fields
    pub rejected: u32,
}

impl ClockTimeDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }
}

impl GroupDecoder for ClockTimeDecoder {
    const GROUP: GroupId = GroupId::CLOCK_TIME;

    fn decode(&mut self, header: &GroupHeader) -> Result<(), DecodeError> {
        Self::expect_group(header)?;

        self.header = Some(*header);
        match ClockTime::from_blocks(header.block_b(), header.block_c(), header.block_d()) {
            Ok(time) => {
                self.time = Some(time);
                Ok(())
            }
            Err(e) => {
                self.rejected += 1;
                warn!("Rejected clock-time group: {}", e);
                Err(e)
            }
        }
    }

    fn header(&self) -> Option<&GroupHeader> {
        self.header.as_ref()
    }
}
