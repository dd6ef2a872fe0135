//! Virtual RDS station
//!
//! Generates the group sequence a real broadcaster would transmit for a
//! configured station, encoded bit-for-bit the way a receiver delivers it.

use rds_monitor::{FrameSource, SourceError};
use rds_protocol::calendar::date_to_mjd;
use rds_protocol::oda::{ALERT_C_AID, ALERT_C_GROUP_TYPE};
use rds_protocol::segment::CARRIAGE_RETURN;
use rds_protocol::{Frame, ProgramId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SimError;

const PS_LEN: usize = 8;
const RT_LEN: usize = 64;
const AF_FILLER: u8 = 205;
const AF_COUNT_BASE: u8 = 224;
const MAX_AF: usize = 25;

/// Clock-time transmitted in 4A groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// UTC year
    pub year: i32,
    /// UTC month (1-12)
    pub month: u8,
    /// UTC day (1-31)
    pub day: u8,
    /// UTC hour
    pub hour: u8,
    /// UTC minute
    pub minute: u8,
    /// Local offset in half hours, negative west of UTC
    pub offset_half_hours: i8,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            year: 2006,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            offset_half_hours: 0,
        }
    }
}

/// Another network announced in 14A groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EonConfig {
    /// PI of the other network
    pub pi: u16,
    /// Its Program Service name
    pub ps: String,
    /// Its program type
    pub pty: u8,
    /// Its TP flag
    pub tp: bool,
    /// Its TA flag
    pub ta: bool,
}

/// Alert-C message carried in 3A/8A groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmcConfig {
    /// Location table number announced in 3A
    pub location_table: u8,
    /// Event code (11 bits)
    pub event: u16,
    /// Location code
    pub location: u16,
    /// Extent (3 bits)
    pub extent: u8,
    /// Negative direction
    pub direction: bool,
    /// Diversion advice
    pub diversion: bool,
    /// Duration and persistence (3 bits)
    pub duration: u8,
}

/// Configuration for creating a virtual station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Program Identification
    pub pi: u16,
    /// Program Service name (up to 8 characters)
    pub ps: String,
    /// Radiotext (up to 64 characters)
    pub radiotext: String,
    /// Program type code
    pub pty: u8,
    /// Traffic Program flag
    pub tp: bool,
    /// Traffic Announcement flag
    pub ta: bool,
    /// Music (true) or speech
    pub music: bool,
    /// Decoder Identification bits (d0 stereo .. d3 dynamic PTY)
    pub decoder_id: u8,
    /// Alternate frequencies in kHz
    pub alternate_frequencies_khz: Vec<u32>,
    /// Program type name
    pub ptyn: Option<String>,
    /// Extended country code sent in 1A
    pub ecc: Option<u8>,
    /// Clock-time sent in 4A
    pub clock: Option<ClockConfig>,
    /// Traffic message sent in 3A/8A
    pub tmc: Option<TmcConfig>,
    /// Other network sent in 14A
    pub eon: Option<EonConfig>,
    /// Empty polls between two groups
    pub idle_polls: u32,
    /// Stop after this many groups
    pub group_limit: Option<u64>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            pi: 0xC201,
            ps: "BBC R1".to_string(),
            radiotext: "HELLO WORLD".to_string(),
            pty: 10,
            tp: true,
            ta: false,
            music: true,
            decoder_id: 0x01,
            alternate_frequencies_khz: vec![88_500, 89_500, 90_500],
            ptyn: None,
            ecc: None,
            clock: Some(ClockConfig::default()),
            tmc: None,
            eon: None,
            idle_polls: 0,
            group_limit: None,
        }
    }
}

impl StationConfig {
    /// Check value ranges that cannot be silently truncated
    pub fn validate(&self) -> Result<(), SimError> {
        if self.pty > 31 {
            return Err(SimError::InvalidConfig(format!("PTY {} out of range", self.pty)));
        }
        if self.decoder_id > 0x0F {
            return Err(SimError::InvalidConfig(format!(
                "decoder identification {:#x} out of range",
                self.decoder_id
            )));
        }
        if let Some(khz) = self
            .alternate_frequencies_khz
            .iter()
            .find(|&&khz| af_code(khz).is_none())
        {
            return Err(SimError::InvalidConfig(format!(
                "alternate frequency {} kHz outside 87.6-107.9 MHz",
                khz
            )));
        }
        if self.alternate_frequencies_khz.len() > MAX_AF {
            return Err(SimError::InvalidConfig(format!(
                "{} alternate frequencies, at most {} allowed",
                self.alternate_frequencies_khz.len(),
                MAX_AF
            )));
        }
        if let Some(clock) = &self.clock {
            if clock.hour > 23
                || clock.minute > 59
                || date_to_mjd(clock.year, clock.month, clock.day).is_none()
            {
                return Err(SimError::InvalidConfig(format!(
                    "clock {:04}-{:02}-{:02} {:02}:{:02} out of range",
                    clock.year, clock.month, clock.day, clock.hour, clock.minute
                )));
            }
            if clock.offset_half_hours.unsigned_abs() > 31 {
                return Err(SimError::InvalidConfig(format!(
                    "local offset {} half hours out of range",
                    clock.offset_half_hours
                )));
            }
        }
        if let Some(eon) = &self.eon {
            if eon.pty > 31 {
                return Err(SimError::InvalidConfig(format!("EON PTY {} out of range", eon.pty)));
            }
        }
        Ok(())
    }
}

fn af_code(khz: u32) -> Option<u8> {
    if khz < 87_600 || khz > 107_900 || khz % 100 != 0 {
        return None;
    }
    u8::try_from((khz - 87_500) / 100).ok()
}

/// Pad or cut text to `len` bytes, replacing anything but printable ASCII
fn fixed_text(text: &str, len: usize) -> Vec<u8> {
    let mut bytes: Vec<u8> = text
        .bytes()
        .map(|b| if b == b' ' || b.is_ascii_graphic() { b } else { b' ' })
        .take(len)
        .collect();
    bytes.resize(len, b' ');
    bytes
}

/// Radiotext bytes: a short message ends with a carriage return and is
/// padded to a whole segment
fn radiotext_bytes(text: &str) -> Vec<u8> {
    let mut bytes = fixed_text(text, text.len().min(RT_LEN));
    if bytes.len() < RT_LEN {
        bytes.push(CARRIAGE_RETURN);
        let padded = bytes.len().div_ceil(4) * 4;
        bytes.resize(padded, b' ');
    }
    bytes
}

fn word(pair: &[u8]) -> u16 {
    u16::from_be_bytes([pair[0], pair[1]])
}

/// A simulated station that plays its group cycle as a frame source
#[derive(Debug, Clone)]
pub struct VirtualStation {
    config: StationConfig,
    /// Radiotext A/B flag
    ab: bool,
    /// One full transmission cycle
    cycle: Vec<Frame>,
    /// Next group in the cycle
    cursor: usize,
    /// Empty polls left before the next group
    idle: u32,
    /// Groups sent so far
    sent: u64,
}

impl VirtualStation {
    /// Create a virtual station from configuration
    pub fn new(config: StationConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut station = Self {
            config,
            ab: false,
            cycle: Vec::new(),
            cursor: 0,
            idle: 0,
            sent: 0,
        };
        station.rebuild();
        Ok(station)
    }

    /// Get the station configuration
    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Groups in one transmission cycle
    pub fn cycle(&self) -> &[Frame] {
        &self.cycle
    }

    /// Number of groups sent so far
    pub fn groups_sent(&self) -> u64 {
        self.sent
    }

    /// Replace the radiotext, toggling the A/B flag so receivers clear theirs
    pub fn set_radiotext(&mut self, text: impl Into<String>) {
        self.config.radiotext = text.into();
        self.ab = !self.ab;
        self.rebuild();
    }

    /// Replace the Program Service name
    pub fn set_program_service(&mut self, ps: impl Into<String>) {
        self.config.ps = ps.into();
        self.rebuild();
    }

    /// Set the Traffic Announcement flag
    pub fn set_traffic_announcement(&mut self, ta: bool) {
        self.config.ta = ta;
        self.rebuild();
    }

    /// Next group of the cycle, regardless of idle polls and limits
    pub fn next_group(&mut self) -> Frame {
        let frame = self.cycle[self.cursor];
        self.cursor = (self.cursor + 1) % self.cycle.len();
        self.sent += 1;
        frame
    }

    fn rebuild(&mut self) {
        let ps = fixed_text(&self.config.ps, PS_LEN);
        let rt = radiotext_bytes(&self.config.radiotext);
        let af_pairs = self.af_pairs();
        let rt_segments = rt.len() / 4;
        // enough 0A groups for the whole AF list, in whole PS cycles
        let basic_groups = rt_segments.max(af_pairs.len()).max(4).div_ceil(4) * 4;

        let mut cycle = Vec::new();
        // the AF list ends with the cycle so one pass leaves it complete
        let af_offset = af_pairs.len() - basic_groups % af_pairs.len();
        for i in 0..basic_groups {
            let segment = i % 4;
            let af = af_pairs[(i + af_offset) % af_pairs.len()];
            cycle.push(self.basic_group(segment as u16, af, &ps[segment * 2..segment * 2 + 2]));
            if i < rt_segments {
                cycle.push(self.radiotext_group(i as u16, &rt[i * 4..i * 4 + 4]));
            }
        }
        if let Some(ecc) = self.config.ecc {
            cycle.push(self.frame(1, 0, u16::from(ecc), 0));
        }
        if let Some(clock) = self.config.clock.and_then(|clock| self.clock_group(&clock)) {
            cycle.push(clock);
        }
        if let Some(ptyn) = &self.config.ptyn {
            let name = fixed_text(ptyn, PS_LEN);
            for segment in 0..2u16 {
                let chars = &name[usize::from(segment) * 4..usize::from(segment) * 4 + 4];
                cycle.push(self.frame(10, segment, word(&chars[..2]), word(&chars[2..])));
            }
        }
        if let Some(tmc) = self.config.tmc {
            cycle.extend(self.tmc_groups(&tmc));
        }
        if let Some(eon) = &self.config.eon {
            cycle.extend(self.eon_groups(eon));
        }

        debug!(
            pi = %ProgramId(self.config.pi),
            groups = cycle.len(),
            "station cycle built"
        );
        self.cycle = cycle;
        self.cursor = 0;
    }

    /// AF code pairs in method A order: count code first, filler last
    fn af_pairs(&self) -> Vec<u16> {
        let codes: Vec<u8> = self
            .config
            .alternate_frequencies_khz
            .iter()
            .filter_map(|&khz| af_code(khz))
            .collect();
        if codes.is_empty() {
            return vec![word(&[AF_FILLER, AF_FILLER])];
        }

        let mut sequence = vec![AF_COUNT_BASE + codes.len() as u8];
        sequence.extend(codes);
        if sequence.len() % 2 != 0 {
            sequence.push(AF_FILLER);
        }
        sequence.chunks(2).map(word).collect()
    }

    /// Block B common header for a version A group
    fn block_b(&self, group_type: u8, payload: u16) -> u16 {
        (u16::from(group_type & 0x0F) << 12)
            | (u16::from(self.config.tp) << 10)
            | (u16::from(self.config.pty & 0x1F) << 5)
            | (payload & 0x1F)
    }

    fn frame(&self, group_type: u8, payload: u16, c: u16, d: u16) -> Frame {
        Frame::new([self.config.pi, self.block_b(group_type, payload), c, d])
    }

    fn basic_group(&self, segment: u16, af: u16, chars: &[u8]) -> Frame {
        let di = (self.config.decoder_id >> (3 - segment)) & 0x01;
        let payload = (u16::from(self.config.ta) << 4)
            | (u16::from(self.config.music) << 3)
            | (u16::from(di) << 2)
            | segment;
        self.frame(0, payload, af, word(chars))
    }

    fn radiotext_group(&self, segment: u16, chars: &[u8]) -> Frame {
        let payload = (u16::from(self.ab) << 4) | segment;
        self.frame(2, payload, word(&chars[..2]), word(&chars[2..]))
    }

    fn clock_group(&self, clock: &ClockConfig) -> Option<Frame> {
        let mjd = date_to_mjd(clock.year, clock.month, clock.day)?;
        let offset = clock.offset_half_hours.unsigned_abs() & 0x1F;
        let sign = u16::from(clock.offset_half_hours < 0) << 5;

        let payload = ((mjd >> 15) & 0x03) as u16;
        let c = (((mjd & 0x7FFF) << 1) as u16) | u16::from(clock.hour >> 4);
        let d = (u16::from(clock.hour & 0x0F) << 12)
            | (u16::from(clock.minute) << 6)
            | sign
            | u16::from(offset);
        Some(self.frame(4, payload, c, d))
    }

    fn tmc_groups(&self, tmc: &TmcConfig) -> [Frame; 2] {
        // 3A: application on 8A, system information variant
        let announcement = self.frame(
            3,
            u16::from(ALERT_C_GROUP_TYPE) << 1,
            u16::from(tmc.location_table & 0x3F) << 6,
            ALERT_C_AID,
        );

        let c = (u16::from(tmc.diversion) << 15)
            | (u16::from(tmc.direction) << 14)
            | (u16::from(tmc.extent & 0x07) << 11)
            | (tmc.event & 0x07FF);
        // single-group message
        let message = self.frame(
            ALERT_C_GROUP_TYPE,
            0x08 | u16::from(tmc.duration & 0x07),
            c,
            tmc.location,
        );
        [announcement, message]
    }

    fn eon_groups(&self, eon: &EonConfig) -> Vec<Frame> {
        let name = fixed_text(&eon.ps, PS_LEN);
        let tp_on = u16::from(eon.tp) << 4;

        let mut groups: Vec<Frame> = (0..4u16)
            .map(|variant| {
                let pair = &name[usize::from(variant) * 2..usize::from(variant) * 2 + 2];
                self.frame(14, tp_on | variant, word(pair), eon.pi)
            })
            .collect();
        let pty_ta = (u16::from(eon.pty & 0x1F) << 11) | u16::from(eon.ta);
        groups.push(self.frame(14, tp_on | 13, pty_ta, eon.pi));
        groups
    }
}

impl FrameSource for VirtualStation {
    fn poll(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.is_exhausted() {
            return Ok(None);
        }
        if self.idle > 0 {
            self.idle -= 1;
            return Ok(None);
        }
        self.idle = self.config.idle_polls;
        Ok(Some(self.next_group()))
    }

    fn is_exhausted(&self) -> bool {
        self.config
            .group_limit
            .is_some_and(|limit| self.sent >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rds_protocol::{
        AlertCBody, BasicTuningDecoder, ClockTimeDecoder, GroupDecoder, GroupHeader,
        OpenDataDecoder, OtherNetworksDecoder, ProgramTypeNameDecoder, RadiotextDecoder,
        SlowLabelingDecoder, TrafficDecoder, TrafficMessage,
    };

    fn headers(station: &VirtualStation) -> Vec<GroupHeader> {
        station.cycle().iter().map(GroupHeader::classify).collect()
    }

    fn decode_all<D: GroupDecoder + Default>(station: &VirtualStation) -> D {
        let mut decoder = D::default();
        for header in headers(station) {
            if header.group() == D::GROUP {
                decoder.decode(&header).unwrap();
            }
        }
        decoder
    }

    #[test]
    fn test_default_station_round_trip() {
        let station = VirtualStation::new(StationConfig::default()).unwrap();

        let basic: BasicTuningDecoder = decode_all(&station);
        assert!(basic.is_complete());
        assert_eq!(basic.ps.text(), "BBC R1  ");
        assert_eq!(basic.af_count, 3);
        assert_eq!(basic.alternate_frequencies_khz(), vec![88_500, 89_500, 90_500]);
        assert!(basic.stereo());
        assert!(basic.music);

        let rt: RadiotextDecoder = decode_all(&station);
        assert!(rt.is_complete());
        assert_eq!(rt.text.text(), "HELLO WORLD^");

        let clock: ClockTimeDecoder = decode_all(&station);
        assert_eq!(clock.time.unwrap().to_string(), "2006-01-01 00:00 UTC");
    }

    #[test]
    fn test_header_fields() {
        let station = VirtualStation::new(StationConfig::default()).unwrap();
        for header in headers(&station) {
            assert_eq!(header.pi().as_u16(), 0xC201);
            assert_eq!(header.program_type, 10);
            assert!(header.traffic_program);
        }
    }

    #[test]
    fn test_full_length_radiotext_has_no_terminator() {
        let config = StationConfig {
            radiotext: "X".repeat(70),
            ..Default::default()
        };
        let station = VirtualStation::new(config).unwrap();
        let rt: RadiotextDecoder = decode_all(&station);
        assert_eq!(rt.completion_mask(), 0xFFFF);
        assert_eq!(rt.text.text(), "X".repeat(64));
    }

    #[test]
    fn test_optional_groups() {
        let config = StationConfig {
            ptyn: Some("JAZZ".into()),
            clock: Some(ClockConfig {
                year: 2024,
                month: 2,
                day: 29,
                hour: 23,
                minute: 45,
                offset_half_hours: -10,
            }),
            eon: Some(EonConfig {
                pi: 0xC202,
                ps: "BBC R2".into(),
                pty: 3,
                tp: true,
                ta: true,
            }),
            ..Default::default()
        };
        let station = VirtualStation::new(config).unwrap();

        let ptyn: ProgramTypeNameDecoder = decode_all(&station);
        assert_eq!(ptyn.name.text(), "JAZZ    ");

        let clock: ClockTimeDecoder = decode_all(&station);
        let time = clock.time.unwrap();
        assert_eq!(time.to_string(), "2024-02-29 23:45 UTC-05:00");
        assert_eq!(time.local().to_string(), "2024-02-29 18:45");

        let eon: OtherNetworksDecoder = decode_all(&station);
        assert_eq!(eon.ps.text(), "BBC R2  ");
        assert_eq!(eon.pty(), Some(3));
        assert_eq!(eon.ta(), Some(true));
        assert!(eon.tp_on);
    }

    #[test]
    fn test_traffic_and_ecc_groups() {
        let config = StationConfig {
            ecc: Some(0xE1),
            tmc: Some(TmcConfig {
                location_table: 5,
                event: 101,
                location: 0x1234,
                extent: 2,
                direction: true,
                diversion: false,
                duration: 3,
            }),
            ..Default::default()
        };
        let station = VirtualStation::new(config).unwrap();

        let slow: SlowLabelingDecoder = decode_all(&station);
        assert_eq!(slow.extended_country_code(), Some(0xE1));

        let oda: OpenDataDecoder = decode_all(&station);
        assert!(oda.is_alert_c());

        let mut traffic = TrafficDecoder::new();
        for header in headers(&station) {
            if header.group() == TrafficDecoder::GROUP {
                traffic.decode(&header, &oda).unwrap();
            }
        }
        assert_eq!(
            traffic.message,
            Some(TrafficMessage::AlertC {
                tuning: false,
                single_group: true,
                duration: 3,
                body: AlertCBody::Single {
                    diversion: false,
                    direction: true,
                    extent: 2,
                    event: 101,
                    location: 0x1234,
                },
            })
        );
    }

    #[test]
    fn test_long_af_list_fits_cycle() {
        let config = StationConfig {
            alternate_frequencies_khz: (0..25).map(|i| 88_000 + i * 200).collect(),
            ..Default::default()
        };
        let station = VirtualStation::new(config).unwrap();
        let basic: BasicTuningDecoder = decode_all(&station);
        assert_eq!(basic.af_count, 25);
        assert_eq!(basic.alternate_frequencies().count(), 25);
    }

    #[test]
    fn test_set_radiotext_toggles_ab() {
        let mut station = VirtualStation::new(StationConfig::default()).unwrap();
        station.set_radiotext("NEW");
        let rt: RadiotextDecoder = decode_all(&station);
        assert!(rt.ab);
        assert_eq!(rt.text.text(), "NEW^");
    }

    #[test]
    fn test_idle_polls_and_limit() {
        let config = StationConfig {
            idle_polls: 2,
            group_limit: Some(2),
            ..Default::default()
        };
        let mut station = VirtualStation::new(config).unwrap();

        let polls: Vec<bool> = (0..8)
            .map(|_| station.poll().unwrap().is_some())
            .collect();
        assert_eq!(polls, vec![true, false, false, true, false, false, false, false]);
        assert!(station.is_exhausted());
        assert_eq!(station.groups_sent(), 2);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let bad_pty = StationConfig {
            pty: 32,
            ..Default::default()
        };
        assert!(matches!(
            VirtualStation::new(bad_pty),
            Err(SimError::InvalidConfig(_))
        ));

        let bad_af = StationConfig {
            alternate_frequencies_khz: vec![87_550],
            ..Default::default()
        };
        assert!(VirtualStation::new(bad_af).is_err());

        let bad_clock = StationConfig {
            clock: Some(ClockConfig {
                hour: 24,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(VirtualStation::new(bad_clock).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_clock_dates() {
        let clock = |year, month, day, hour, minute| StationConfig {
            clock: Some(ClockConfig {
                year,
                month,
                day,
                hour,
                minute,
                offset_half_hours: 0,
            }),
            ..Default::default()
        };

        // MJD past 17 bits and past the decodable range
        assert!(matches!(
            clock(2300, 1, 1, 0, 0).validate(),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(clock(2100, 3, 1, 0, 0).validate().is_err());
        assert!(clock(1899, 12, 31, 0, 0).validate().is_err());
        assert!(clock(i32::MIN, 1, 1, 0, 0).validate().is_err());
        assert!(clock(i32::MAX, 1, 1, 0, 0).validate().is_err());

        // impossible calendar dates
        assert!(clock(2024, 2, 31, 0, 0).validate().is_err());
        assert!(clock(2023, 2, 29, 0, 0).validate().is_err());
        assert!(clock(2024, 6, 31, 0, 0).validate().is_err());
        assert!(clock(2024, 0, 1, 0, 0).validate().is_err());
        assert!(clock(2024, 13, 1, 0, 0).validate().is_err());
        assert!(clock(2024, 1, 0, 0, 0).validate().is_err());

        // time of day
        assert!(clock(2024, 1, 1, 24, 0).validate().is_err());
        assert!(clock(2024, 1, 1, 0, 60).validate().is_err());

        assert!(clock(2024, 2, 29, 23, 59).validate().is_ok());
        assert!(clock(2100, 2, 28, 0, 0).validate().is_ok());
    }

    #[test]
    fn test_json_clock_out_of_range_is_rejected() {
        let config: StationConfig = serde_json::from_str(
            r#"{ "clock": { "year": 2300, "month": 1, "day": 1, "hour": 0, "minute": 0, "offset_half_hours": 0 } }"#,
        )
        .unwrap();
        assert!(matches!(
            VirtualStation::new(config),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_from_json() {
        let config: StationConfig =
            serde_json::from_str(r#"{ "pi": 49666, "ps": "TEST", "clock": null }"#).unwrap();
        assert_eq!(config.pi, 0xC202);
        assert_eq!(config.ps, "TEST");
        assert_eq!(config.clock, None);
        assert_eq!(config.radiotext, "HELLO WORLD");
    }
}
