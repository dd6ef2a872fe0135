//! RDS Simulation Library
//!
//! This crate provides frame sources for running the monitor without a
//! tuner. It includes:
//!
//! - **VirtualStation**: Generates the group cycle of a configured station
//! - **FrameLog**: Replays a text log of captured groups
//!
//! # Example
//!
//! ```rust
//! use rds_monitor::{Monitor, MonitorConfig, NoDelay, Outcome};
//! use rds_sim::{StationConfig, VirtualStation};
//!
//! let station = VirtualStation::new(StationConfig {
//!     ps: "RADIO 1".into(),
//!     radiotext: "NOW PLAYING".into(),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let mut monitor = Monitor::with_delay(station, MonitorConfig::default(), NoDelay);
//! let report = monitor.run().unwrap();
//!
//! assert_eq!(report.outcome, Outcome::Completed);
//! assert_eq!(report.basic.unwrap().ps.text(), "RADIO 1 ");
//! assert_eq!(report.radiotext.unwrap().text.text(), "NOW PLAYING^");
//! ```

pub mod error;
pub mod replay;
pub mod station;

pub use error::SimError;
pub use replay::FrameLog;
pub use station::{ClockConfig, EonConfig, StationConfig, TmcConfig, VirtualStation};
