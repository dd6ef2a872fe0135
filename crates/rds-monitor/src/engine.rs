//! Monitoring session engine
//!
//! A session polls the frame source until the completion condition holds,
//! the time budget runs out, the caller asks it to stop, or the source is
//! exhausted. Time is accounted per poll rather than read from a clock: a
//! poll that returns a group costs the settle interval (the receiver needs
//! it to clear its data-ready flag), an empty poll costs the retry interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rds_protocol::{
    BasicTuningDecoder, GroupDecoder, GroupHeader, GroupId, GroupMask, ProgramId, SegmentedText,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::error::MonitorError;
use crate::report::{Counters, MonitorReport, Outcome};
use crate::source::{Delay, FrameSource, ThreadDelay};
use crate::state::{DecoderSet, GroupStats};

/// Default session budget
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Wait after a poll that returned a group
pub const DEFAULT_SETTLE_MS: u64 = 40;

/// Wait after a poll that returned nothing
pub const DEFAULT_RETRY_MS: u64 = 30;

/// Built-in completion conditions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// Run until timeout or stop
    Never,
    /// Program Service name fully received
    ProgramService,
    /// Program Service name and radiotext fully received
    #[default]
    ProgramServiceAndRadiotext,
}

impl Completion {
    /// Check the condition against the current decoder state
    pub fn is_met(&self, decoders: &DecoderSet) -> bool {
        match self {
            Completion::Never => false,
            Completion::ProgramService => decoders.program_service_complete(),
            Completion::ProgramServiceAndRadiotext => {
                decoders.program_service_complete() && decoders.radiotext_complete()
            }
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Time budget in milliseconds; `None` runs until stopped or complete
    pub timeout_ms: Option<u64>,
    /// Group types surfaced in the report
    pub group_filter: GroupMask,
    /// Completion condition used by [`Monitor::run`]
    pub completion: Completion,
    /// Wait after a poll that returned a group (ms)
    pub settle_ms: u64,
    /// Wait after a poll that returned nothing (ms)
    pub retry_ms: u64,
    /// Drop frames with an uncorrectable block instead of decoding them
    pub skip_uncorrectable: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Some(DEFAULT_TIMEOUT_MS),
            group_filter: GroupMask::ALL,
            completion: Completion::default(),
            settle_ms: DEFAULT_SETTLE_MS,
            retry_ms: DEFAULT_RETRY_MS,
            skip_uncorrectable: false,
        }
    }
}

impl MonitorConfig {
    /// Time budget as a duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Result of a quick station-name scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramServiceScan {
    /// PI of the last 0A group received
    pub pi: Option<ProgramId>,
    /// Program Service name as far as it was received
    pub name: SegmentedText<8>,
    /// Accumulated poll time in milliseconds
    pub elapsed_ms: u64,
}

impl ProgramServiceScan {
    /// All four name segments arrived
    pub fn is_complete(&self) -> bool {
        self.name.is_complete()
    }
}

/// Session aggregator over a frame source
pub struct Monitor<S, D = ThreadDelay> {
    config: MonitorConfig,
    source: S,
    delay: D,
    stop: Arc<AtomicBool>,
}

impl<S: FrameSource> Monitor<S, ThreadDelay> {
    /// Create a monitor that sleeps between polls
    pub fn new(source: S, config: MonitorConfig) -> Self {
        Self::with_delay(source, config, ThreadDelay)
    }
}

impl<S: FrameSource, D: Delay> Monitor<S, D> {
    /// Create a monitor with a custom delay
    pub fn with_delay(source: S, config: MonitorConfig, delay: D) -> Self {
        Self {
            config,
            source,
            delay,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an externally owned stop flag
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Flag that ends the session at the next iteration when set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Get the current configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Update the configuration
    pub fn set_config(&mut self, config: MonitorConfig) {
        self.config = config;
    }

    /// Get the frame source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the frame source
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the monitor and return the frame source
    pub fn into_source(self) -> S {
        self.source
    }

    /// Run a session with the configured completion condition
    pub fn run(&mut self) -> Result<MonitorReport, MonitorError> {
        let completion = self.config.completion;
        self.session(|decoders| completion.is_met(decoders), |_, _| {})
    }

    /// Run a session that completes when `done` returns true
    pub fn run_until<F>(&mut self, done: F) -> Result<MonitorReport, MonitorError>
    where
        F: FnMut(&DecoderSet) -> bool,
    {
        self.session(done, |_, _| {})
    }

    /// Run a session with the configured completion, calling `on_group` after every group
    pub fn run_with<G>(&mut self, on_group: G) -> Result<MonitorReport, MonitorError>
    where
        G: FnMut(&GroupHeader, &DecoderSet),
    {
        let completion = self.config.completion;
        self.session(|decoders| completion.is_met(decoders), on_group)
    }

    /// Collect only the Program Service name, giving up after `timeout`
    ///
    /// Every group other than 0A is ignored and the group filter does not
    /// apply.
    pub fn scan_program_service(
        &mut self,
        timeout: Duration,
    ) -> Result<ProgramServiceScan, MonitorError> {
        self.source.open()?;

        let budget = timeout.as_millis() as u64;
        let mut basic = BasicTuningDecoder::new();
        let mut elapsed_ms = 0;

        while elapsed_ms < budget && !basic.is_complete() && !self.stop_requested() {
            match self.source.poll()? {
                Some(frame) if frame.ready => {
                    let header = GroupHeader::classify(&frame);
                    if header.group() == GroupId::BASIC_TUNING {
                        if let Err(e) = basic.decode(&header) {
                            debug!(header = %header, "decode error: {}", e);
                        }
                    }
                    self.delay.delay_ms(self.config.settle_ms);
                    elapsed_ms += self.config.settle_ms;
                }
                _ => {
                    if self.source.is_exhausted() {
                        break;
                    }
                    self.delay.delay_ms(self.config.retry_ms);
                    elapsed_ms += self.config.retry_ms;
                }
            }
        }

        debug!(
            ps = %basic.ps,
            complete = basic.is_complete(),
            elapsed_ms,
            "program service scan finished"
        );
        Ok(ProgramServiceScan {
            pi: basic.header().map(GroupHeader::pi),
            name: basic.ps,
            elapsed_ms,
        })
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn session<P, G>(&mut self, mut done: P, mut on_group: G) -> Result<MonitorReport, MonitorError>
    where
        P: FnMut(&DecoderSet) -> bool,
        G: FnMut(&GroupHeader, &DecoderSet),
    {
        self.source.open()?;

        let timeout_ms = self.config.timeout_ms;
        info!(
            timeout_ms = ?timeout_ms,
            filter = %self.config.group_filter,
            "Monitoring RDS"
        );

        let mut decoders = DecoderSet::new();
        let mut groups = GroupStats::new();
        let mut counters = Counters::default();
        let mut pi = None;
        let mut elapsed_ms: u64 = 0;

        let outcome = loop {
            if self.stop_requested() {
                break Outcome::Stopped;
            }
            if done(&decoders) {
                break Outcome::Completed;
            }

            counters.polls += 1;
            match self.source.poll()? {
                Some(frame) if frame.ready => {
                    counters.frames += 1;
                    let uncorrectable = frame.block_errors.any_uncorrectable();
                    if uncorrectable {
                        counters.uncorrectable += 1;
                    }

                    if uncorrectable && self.config.skip_uncorrectable {
                        trace!(frame = %frame, "skipping frame with uncorrectable blocks");
                    } else {
                        let header = GroupHeader::classify(&frame);
                        trace!(header = %header, "group");
                        groups.record(&header);
                        pi = Some(header.pi());

                        match decoders.dispatch(&header) {
                            Ok(true) => counters.decoded += 1,
                            Ok(false) => {}
                            Err(e) => {
                                counters.decode_errors += 1;
                                debug!(group = %header.group(), "decode error: {}", e);
                            }
                        }
                        on_group(&header, &decoders);
                    }

                    self.delay.delay_ms(self.config.settle_ms);
                    elapsed_ms += self.config.settle_ms;
                }
                _ => {
                    if self.source.is_exhausted() {
                        break Outcome::Exhausted;
                    }
                    self.delay.delay_ms(self.config.retry_ms);
                    elapsed_ms += self.config.retry_ms;
                }
            }

            if timeout_ms.is_some_and(|limit| elapsed_ms >= limit) {
                break Outcome::TimedOut;
            }
        };

        info!(
            outcome = outcome.label(),
            elapsed_ms,
            groups = %groups.seen,
            frames = counters.frames,
            "Monitoring finished"
        );

        Ok(MonitorReport::new(
            outcome,
            elapsed_ms,
            pi,
            groups,
            counters,
            self.config.group_filter,
            decoders,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{NoDelay, ScriptedSource};
    use rds_protocol::Frame;

    /// Records every requested delay
    #[derive(Default)]
    struct RecordingDelay(Vec<u64>);

    impl Delay for RecordingDelay {
        fn delay_ms(&mut self, ms: u64) {
            self.0.push(ms);
        }
    }

    fn ps_frame(segment: u16, chars: &[u8; 2]) -> Frame {
        Frame::new([0xC201, segment, 0, u16::from_be_bytes(*chars)])
    }

    #[test]
    fn test_delays_follow_poll_result() {
        let source = ScriptedSource::new([Some(ps_frame(0, b"AB")), None, Some(Frame::not_ready())]);
        let config = MonitorConfig {
            timeout_ms: Some(100),
            completion: Completion::Never,
            ..Default::default()
        };
        let mut monitor = Monitor::with_delay(source, config, RecordingDelay::default());
        let report = monitor.run().unwrap();

        assert_eq!(report.outcome, Outcome::TimedOut);
        assert_eq!(report.elapsed_ms, 100);
        assert_eq!(monitor.delay.0, vec![40, 30, 30]);
        assert_eq!(report.counters.polls, 3);
        assert_eq!(report.counters.frames, 1);
    }

    #[test]
    fn test_config_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.timeout(), Some(Duration::from_millis(15_000)));
        assert_eq!(config.group_filter, GroupMask::ALL);
        assert_eq!(config.completion, Completion::ProgramServiceAndRadiotext);
        assert_eq!(config.settle_ms, 40);
        assert_eq!(config.retry_ms, 30);
    }

    #[test]
    fn test_scan_program_service() {
        let source = ScriptedSource::new([
            Some(ps_frame(0, b"BB")),
            Some(Frame::new([0xC201, 0x2000, 0x4142, 0x4344])),
            None,
            Some(ps_frame(1, b"C ")),
            Some(ps_frame(2, b"R1")),
            Some(ps_frame(3, b"  ")),
            Some(ps_frame(0, b"XX")),
        ]);
        let mut monitor = Monitor::with_delay(source, MonitorConfig::default(), NoDelay);
        let scan = monitor
            .scan_program_service(Duration::from_millis(5_000))
            .unwrap();

        assert!(scan.is_complete());
        assert_eq!(scan.name.text(), "BBC R1  ");
        assert_eq!(scan.pi, Some(ProgramId(0xC201)));
        assert_eq!(scan.elapsed_ms, 5 * 40 + 30);
        // the trailing frame was never polled
        assert_eq!(monitor.source().remaining(), 1);
    }

    #[test]
    fn test_scan_ignores_other_groups() {
        // 0B carries PS segments too but only 0A counts
        let source = ScriptedSource::new([
            Some(Frame::new([0xC201, 0x0800, 0xC201, u16::from_be_bytes(*b"ZZ")])),
            Some(ps_frame(0, b"AB")),
            Some(Frame::new([0xC201, 0x0801, 0xC201, u16::from_be_bytes(*b"ZZ")])),
        ]);
        let mut monitor = Monitor::with_delay(source, MonitorConfig::default(), NoDelay);
        let scan = monitor
            .scan_program_service(Duration::from_millis(120))
            .unwrap();

        assert!(!scan.is_complete());
        assert_eq!(scan.name.valid_mask(), 0x01);
        assert_eq!(&scan.name.text()[..2], "AB");
        assert_eq!(scan.elapsed_ms, 3 * 40);
    }

    #[test]
    fn test_scan_gives_up() {
        let source = ScriptedSource::new([Some(ps_frame(0, b"BB"))]);
        let mut monitor = Monitor::with_delay(source, MonitorConfig::default(), NoDelay);
        let scan = monitor
            .scan_program_service(Duration::from_millis(100))
            .unwrap();

        assert!(!scan.is_complete());
        assert_eq!(scan.name.valid_mask(), 0x01);
        assert_eq!(scan.elapsed_ms, 100);
    }
}
