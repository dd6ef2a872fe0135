//! Session report

use rds_protocol::{
    BasicTuningDecoder, ClockTimeDecoder, GroupMask, OpenDataDecoder, OtherNetworksDecoder,
    ProgramId, ProgramTypeNameDecoder, RadiotextDecoder, SlowLabelingDecoder, TrafficDecoder,
    TransparentDataDecoder,
};
use serde::Serialize;

use crate::state::{DecoderSet, GroupStats};

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Completion condition was met
    Completed,
    /// Time budget ran out first
    TimedOut,
    /// Stop was requested by the caller
    Stopped,
    /// Source has no more frames
    Exhausted,
}

impl Outcome {
    /// Short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::TimedOut => "timed out",
            Outcome::Stopped => "stopped",
            Outcome::Exhausted => "source exhausted",
        }
    }
}

/// Poll and frame counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Polls made on the source
    pub polls: u64,
    /// Ready frames received
    pub frames: u64,
    /// Groups a decoder accepted
    pub decoded: u64,
    /// Groups a decoder rejected
    pub decode_errors: u64,
    /// Frames with at least one uncorrectable block
    pub uncorrectable: u64,
}

/// Everything a session accumulated
///
/// Decoder states are present only for the group types in the session's
/// filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorReport {
    /// Why the session ended
    pub outcome: Outcome,
    /// Accumulated poll time in milliseconds
    pub elapsed_ms: u64,
    /// PI of the last group received
    pub pi: Option<ProgramId>,
    /// Observed group types
    pub groups: GroupStats,
    /// Poll and frame counters
    pub counters: Counters,
    /// Group types surfaced in this report
    pub filter: GroupMask,
    /// 0A state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic: Option<BasicTuningDecoder>,
    /// 1A state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slow_label: Option<SlowLabelingDecoder>,
    /// 2A state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radiotext: Option<RadiotextDecoder>,
    /// 3A state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oda: Option<OpenDataDecoder>,
    /// 4A state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<ClockTimeDecoder>,
    /// 5A state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparent: Option<TransparentDataDecoder>,
    /// 8A state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic: Option<TrafficDecoder>,
    /// 10A state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ptyn: Option<ProgramTypeNameDecoder>,
    /// 14A state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eon: Option<OtherNetworksDecoder>,
}

impl MonitorReport {
    /// Build a report from the final session state, keeping only filtered groups
    pub fn new(
        outcome: Outcome,
        elapsed_ms: u64,
        pi: Option<ProgramId>,
        groups: GroupStats,
        counters: Counters,
        filter: GroupMask,
        decoders: DecoderSet,
    ) -> Self {
        let keep = |group_type: u8| filter.contains(group_type);
        Self {
            outcome,
            elapsed_ms,
            pi,
            groups,
            counters,
            filter,
            basic: keep(0).then_some(decoders.basic),
            slow_label: keep(1).then_some(decoders.slow_label),
            radiotext: keep(2).then_some(decoders.radiotext),
            oda: keep(3).then_some(decoders.oda),
            clock: keep(4).then_some(decoders.clock),
            transparent: keep(5).then_some(decoders.transparent),
            traffic: keep(8).then_some(decoders.traffic),
            ptyn: keep(10).then_some(decoders.ptyn),
            eon: keep(14).then_some(decoders.eon),
        }
    }

    /// Session ended because the completion condition held
    pub fn is_complete(&self) -> bool {
        self.outcome == Outcome::Completed
    }

    /// No RDS group was received at all
    pub fn no_rds(&self) -> bool {
        self.groups.seen.is_empty()
    }
}
