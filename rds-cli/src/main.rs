//! RDS Monitor
//!
//! Runs a monitoring session over a replayed frame log or a simulated
//! station and prints what the group decoders collected.
//!
//! # Usage Examples
//!
//! ## Replay a captured log
//! ```bash
//! rdsmon replay capture.log --log
//! ```
//!
//! ## Simulate a station and print the report as JSON
//! ```bash
//! rdsmon simulate --station station.json --json
//! ```
//!
//! ## Quick station-name scan
//! ```bash
//! rdsmon --ps-only --timeout-ms 2000 simulate
//! ```

mod render;
mod settings;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rds_monitor::{
    Completion, Delay, FrameSource, Monitor, MonitorError, NoDelay, ThreadDelay,
};
use rds_protocol::{GroupMask, ProgramId, PtyTable, Version};
use rds_sim::{FrameLog, SimError, StationConfig, VirtualStation};
use settings::{Settings, SettingsError};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("failed to read station file: {0}")]
    Station(#[source] io::Error),

    #[error("invalid station file: {0}")]
    StationFormat(#[source] serde_json::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Until {
    /// Run until the time budget runs out
    Never,
    /// Stop once the Program Service name is complete
    Ps,
    /// Stop once the PS name and radiotext are complete
    PsRt,
}

impl From<Until> for Completion {
    fn from(until: Until) -> Self {
        match until {
            Until::Never => Completion::Never,
            Until::Ps => Completion::ProgramService,
            Until::PsRt => Completion::ProgramServiceAndRadiotext,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a frame log (four hex blocks per line, `-` for an empty poll)
    Replay {
        /// Frame log path
        path: PathBuf,
    },
    /// Monitor a simulated station
    Simulate {
        /// Station configuration (JSON); defaults to the one in settings
        #[arg(long)]
        station: Option<PathBuf>,
    },
    /// Print the effective settings
    Settings {
        /// Write them to the settings file
        #[arg(long, default_value_t = false)]
        save: bool,
    },
}

#[derive(Parser, Debug)]
#[command(author, version, about = "RDS group monitor for replayed and simulated receivers", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Time budget in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Run without a time budget
    #[arg(long, global = true, default_value_t = false, conflicts_with = "timeout_ms")]
    no_timeout: bool,

    /// Group types to report, e.g. "0,2,4" or "all"
    #[arg(long, global = true, value_parser = parse_groups)]
    groups: Option<GroupMask>,

    /// Completion condition
    #[arg(long, global = true)]
    until: Option<Until>,

    /// Print a line for every received group in the filter
    #[arg(long, global = true, default_value_t = false)]
    log: bool,

    /// Print the report as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Sleep between polls like a real receiver
    #[arg(long, global = true, default_value_t = false)]
    realtime: bool,

    /// Only scan for the Program Service name
    #[arg(long, global = true, default_value_t = false)]
    ps_only: bool,

    /// Interpret PTY codes with the European RDS table
    #[arg(long, global = true, default_value_t = false)]
    rds_pty: bool,

    /// Verbosity level (-v=debug, -vv=trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

/// Parse a comma-separated list of group type numbers
fn parse_groups(list: &str) -> Result<GroupMask, String> {
    if list.trim().eq_ignore_ascii_case("all") {
        return Ok(GroupMask::ALL);
    }

    let mut mask = GroupMask::EMPTY;
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let group_type: u8 = item
            .trim_end_matches(['A', 'a'])
            .parse()
            .map_err(|_| format!("'{}' is not a group type", item))?;
        if group_type > 15 {
            return Err(format!("group type {} out of range 0-15", group_type));
        }
        mask.insert(group_type);
    }
    if mask.is_empty() {
        return Err("no group types given".to_string());
    }
    Ok(mask)
}

impl Args {
    /// Settings from disk with command-line overrides applied
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(timeout_ms) = self.timeout_ms {
            settings.timeout_ms = Some(timeout_ms);
        }
        if self.no_timeout {
            settings.timeout_ms = None;
        }
        if let Some(mask) = self.groups {
            settings.groups = mask.iter().collect();
        }
        if let Some(until) = self.until {
            settings.completion = until.into();
        }
        if self.realtime {
            settings.realtime = true;
        }
        if self.rds_pty {
            settings.pty_table = PtyTable::Rds;
        }
        settings
    }
}

fn load_station(path: &Path) -> Result<StationConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(CliError::Station)?;
    serde_json::from_str(&text).map_err(CliError::StationFormat)
}

fn main() {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "rdsmon=info,rds_protocol=info,rds_monitor=info,rds_sim=info",
        1 => "rdsmon=debug,rds_protocol=debug,rds_monitor=debug,rds_sim=debug",
        _ => "rdsmon=trace,rds_protocol=trace,rds_monitor=trace,rds_sim=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let settings = args.apply(Settings::load());

    let source: Box<dyn FrameSource> = match &args.command {
        Command::Settings { save } => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            if *save {
                let path = settings.save()?;
                info!(path = %path.display(), "settings saved");
            }
            return Ok(());
        }
        Command::Replay { path } => {
            let log = FrameLog::from_path(path)?;
            info!(
                path = %path.display(),
                polls = log.len(),
                frames = log.frame_count(),
                "Replaying frame log"
            );
            Box::new(log.into_source())
        }
        Command::Simulate { station } => {
            let config = match station {
                Some(path) => load_station(path)?,
                None => settings.station.clone(),
            };
            info!(ps = %config.ps, pi = %ProgramId(config.pi), "Simulating station");
            Box::new(VirtualStation::new(config)?)
        }
    };

    if settings.timeout_ms.is_none() {
        warn!("no time budget, running until complete or the source ends");
    }

    let config = settings.monitor_config();
    if settings.realtime {
        session(Monitor::with_delay(source, config, ThreadDelay), args, &settings)
    } else {
        session(Monitor::with_delay(source, config, NoDelay), args, &settings)
    }
}

fn session<S: FrameSource, D: Delay>(
    mut monitor: Monitor<S, D>,
    args: &Args,
    settings: &Settings,
) -> Result<(), CliError> {
    if args.ps_only {
        let budget = Duration::from_millis(settings.timeout_ms.unwrap_or(u64::MAX));
        let scan = monitor.scan_program_service(budget)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&scan)?);
        } else {
            println!("{}", render::scan_line(&scan));
        }
        return Ok(());
    }

    let filter = monitor.config().group_filter;
    let json = args.json;
    let report = if args.log {
        monitor.run_with(|header, decoders| {
            if header.version != Version::A || !filter.contains(header.group_type) {
                return;
            }
            let line = render::group_line(header, decoders);
            // stdout carries the JSON document
            if json {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        })?
    } else {
        monitor.run()?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::summary(&report, settings.pty_table));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_groups() {
        assert_eq!(parse_groups("all"), Ok(GroupMask::ALL));
        assert_eq!(parse_groups("0, 2,4A"), Ok(GroupMask(0x0015)));
        assert!(parse_groups("16").is_err());
        assert!(parse_groups("x").is_err());
        assert!(parse_groups(",").is_err());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "rdsmon",
            "replay",
            "capture.log",
            "--no-timeout",
            "--groups",
            "0,2",
            "--until",
            "ps",
            "--rds-pty",
        ]);
        let settings = args.apply(Settings::default());
        assert_eq!(settings.timeout_ms, None);
        assert_eq!(settings.groups, vec![0, 2]);
        assert_eq!(settings.completion, Completion::ProgramService);
        assert_eq!(settings.pty_table, PtyTable::Rds);
        assert!(matches!(args.command, Command::Replay { .. }));
    }

    #[test]
    fn test_timeout_flags_conflict() {
        let result = Args::try_parse_from([
            "rdsmon",
            "simulate",
            "--timeout-ms",
            "100",
            "--no-timeout",
        ]);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn group_list_matches_mask(groups in proptest::collection::vec(0u8..16, 1..16)) {
            let list = groups
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let mask = parse_groups(&list).unwrap();
            for g in 0..16u8 {
                prop_assert_eq!(mask.contains(g), groups.contains(&g));
            }
        }
    }
}
