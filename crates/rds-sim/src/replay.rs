//! Frame log replay
//!
//! A frame log is a text file with one poll result per line: four hex
//! blocks for a received group, or `-` for a poll that returned nothing.
//! Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! # PI   B    C    D
//! C201 0408 E0CD 4242
//! -
//! C201 2400 4845 4C4C
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use rds_monitor::ScriptedSource;
use rds_protocol::Frame;
use tracing::debug;

use crate::error::SimError;

const NO_DATA: &str = "-";

/// Parsed frame log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameLog {
    entries: Vec<Option<Frame>>,
}

impl FrameLog {
    /// Parse a log held in memory
    pub fn parse(text: &str) -> Result<Self, SimError> {
        Self::from_reader(text.as_bytes())
    }

    /// Read a log file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let log = Self::from_reader(File::open(path)?)?;
        debug!(path = %path.display(), entries = log.len(), "frame log loaded");
        Ok(log)
    }

    /// Read a log from any byte stream
    pub fn from_reader(reader: impl Read) -> Result<Self, SimError> {
        let mut entries = Vec::new();
        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line == NO_DATA {
                entries.push(None);
                continue;
            }
            let frame = Frame::from_str(line).map_err(|source| SimError::Parse {
                line: index + 1,
                source,
            })?;
            entries.push(Some(frame));
        }
        Ok(Self { entries })
    }

    /// Poll results in log order
    pub fn entries(&self) -> &[Option<Frame>] {
        &self.entries
    }

    /// Number of poll results
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Log has no poll results
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of received groups
    pub fn frame_count(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Source that plays the log once and then reports exhaustion
    pub fn into_source(self) -> ScriptedSource {
        ScriptedSource::new(self.entries).finite()
    }
}

impl FromIterator<Option<Frame>> for FrameLog {
    fn from_iter<I: IntoIterator<Item = Option<Frame>>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rds_monitor::FrameSource;
    use rds_protocol::ParseError;

    const LOG: &str = "\
# captured from a test transmitter
C201 0408 E0CD 4242

-
0xC201 0x2400 0x4845 0x4C4C
";

    #[test]
    fn test_parse_log() {
        let log = FrameLog::parse(LOG).unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log.frame_count(), 2);
        assert_eq!(
            log.entries()[0],
            Some(Frame::new([0xC201, 0x0408, 0xE0CD, 0x4242]))
        );
        assert_eq!(log.entries()[1], None);
        assert_eq!(log.entries()[2].map(|f| f.blocks[1]), Some(0x2400));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = FrameLog::parse("C201 0408 E0CD 4242\n\nC201 0408\n").unwrap_err();
        match err {
            SimError::Parse { line, source } => {
                assert_eq!(line, 3);
                assert_eq!(source, ParseError::BlockCount(2));
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = FrameLog::parse("C201 XYZ0 E0CD 4242").unwrap_err();
        assert!(matches!(
            err,
            SimError::Parse {
                line: 1,
                source: ParseError::InvalidBlock(_)
            }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = FrameLog::from_path("/nonexistent/rds.log").unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }

    #[test]
    fn test_into_source_exhausts() {
        let mut source = FrameLog::parse(LOG).unwrap().into_source();
        let mut frames = 0;
        while !source.is_exhausted() {
            if source.poll().unwrap().is_some() {
                frames += 1;
            }
        }
        assert_eq!(frames, 2);
        assert_eq!(source.polls(), 4);
    }
}
