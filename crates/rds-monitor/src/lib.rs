//! RDS Monitor Engine
//!
//! This crate runs a monitoring session over a source of RDS frames and
//! collects what the group decoders from `rds_protocol` accumulate.
//!
//! # Architecture
//!
//! A [`Monitor`] polls its [`FrameSource`] one frame at a time. Each ready
//! frame is classified and dispatched to the decoder for its group; all
//! decoders live in one [`DecoderSet`] for the length of the session. The
//! session ends when:
//!
//! - **Completed**: the completion condition holds (by default, PS name and
//!   radiotext both fully received)
//! - **Timed out**: the accumulated poll time reaches the budget
//! - **Stopped**: the caller set the stop flag
//! - **Exhausted**: a finite source ran out of frames
//!
//! The result is a [`MonitorReport`] holding the decoder states for the
//! group types in the configured filter.
//!
//! # Example
//!
//! ```rust
//! use rds_monitor::{Completion, Monitor, MonitorConfig, NoDelay, Outcome, ScriptedSource};
//! use rds_protocol::Frame;
//!
//! let frames = [b"BB", b"C ", b"R1", b"  "]
//!     .iter()
//!     .enumerate()
//!     .map(|(seg, chars)| Frame::new([0xC201, seg as u16, 0, u16::from_be_bytes(**chars)]));
//!
//! let config = MonitorConfig {
//!     completion: Completion::ProgramService,
//!     ..Default::default()
//! };
//! let mut monitor = Monitor::with_delay(ScriptedSource::from_frames(frames), config, NoDelay);
//! let report = monitor.run().unwrap();
//!
//! assert_eq!(report.outcome, Outcome::Completed);
//! assert_eq!(report.basic.unwrap().ps.text(), "BBC R1  ");
//! ```

pub mod engine;
pub mod error;
pub mod report;
pub mod source;
pub mod state;

pub use engine::{
    Completion, Monitor, MonitorConfig, ProgramServiceScan, DEFAULT_RETRY_MS, DEFAULT_SETTLE_MS,
    DEFAULT_TIMEOUT_MS,
};
pub use error::{MonitorError, SourceError};
pub use report::{Counters, MonitorReport, Outcome};
pub use source::{Delay, FrameSource, NoDelay, ScriptedSource, ThreadDelay};
pub use state::{DecoderSet, GroupStats};
