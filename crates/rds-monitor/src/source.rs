//! Frame sources and the delay between polls
//!
//! A [`FrameSource`] is anything that can hand over the next RDS group: a
//! tuner driver, a replayed log, a simulated station. Polling never blocks;
//! `Ok(None)` means no new group this tick.

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use rds_protocol::Frame;

use crate::error::SourceError;

/// Non-blocking supplier of RDS frames
pub trait FrameSource {
    /// Prepare the source, called once before each session
    fn open(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Read the next frame, if one is available
    fn poll(&mut self) -> Result<Option<Frame>, SourceError>;

    /// The source will never produce another frame
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn open(&mut self) -> Result<(), SourceError> {
        (**self).open()
    }

    fn poll(&mut self) -> Result<Option<Frame>, SourceError> {
        (**self).poll()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn open(&mut self) -> Result<(), SourceError> {
        (**self).open()
    }

    fn poll(&mut self) -> Result<Option<Frame>, SourceError> {
        (**self).poll()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

/// Wait between polls
pub trait Delay {
    /// Suspend for `ms` milliseconds
    fn delay_ms(&mut self, ms: u64);
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay_ms(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

/// Returns immediately; elapsed time is still accounted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay_ms(&mut self, _ms: u64) {}
}

/// Plays back a fixed sequence of polls
///
/// Each entry is one poll result: `Some(frame)` or `None` for "no data".
/// Once drained the source either idles (returns `None` forever) or, if
/// built with [`ScriptedSource::finite`], reports itself exhausted after
/// the first poll that finds nothing left.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: VecDeque<Option<Frame>>,
    finite: bool,
    drained: bool,
    polls: usize,
}

impl ScriptedSource {
    /// Create a source from poll results
    pub fn new(script: impl IntoIterator<Item = Option<Frame>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            finite: false,
            drained: false,
            polls: 0,
        }
    }

    /// Create a source that delivers every frame on consecutive polls
    pub fn from_frames(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self::new(frames.into_iter().map(Some))
    }

    /// Report exhaustion once the script is drained
    pub fn finite(mut self) -> Self {
        self.finite = true;
        self
    }

    /// Queue another poll result
    pub fn push(&mut self, entry: Option<Frame>) {
        self.script.push_back(entry);
        self.drained = false;
    }

    /// Poll results not yet delivered
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Number of polls made so far
    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl FrameSource for ScriptedSource {
    fn poll(&mut self) -> Result<Option<Frame>, SourceError> {
        self.polls += 1;
        match self.script.pop_front() {
            Some(entry) => Ok(entry),
            None => {
                self.drained = true;
                Ok(None)
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.finite && self.drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_order() {
        let frame = Frame::new([0xC201, 0x0000, 0x0000, 0x2020]);
        let mut source = ScriptedSource::new([Some(frame), None]);

        assert_eq!(source.poll().unwrap(), Some(frame));
        assert_eq!(source.poll().unwrap(), None);
        assert_eq!(source.poll().unwrap(), None);
        assert_eq!(source.polls(), 3);
        assert!(!source.is_exhausted());
    }

    #[test]
    fn test_finite_source_exhausts() {
        let mut source = ScriptedSource::new([Some(Frame::new([0; 4])), None]).finite();
        assert!(source.poll().unwrap().is_some());
        assert!(source.poll().unwrap().is_none());
        assert!(!source.is_exhausted());
        assert_eq!(source.remaining(), 0);

        assert!(source.poll().unwrap().is_none());
        assert!(source.is_exhausted());

        source.push(Some(Frame::new([0; 4])));
        assert!(!source.is_exhausted());
    }

    #[test]
    fn test_boxed_source_forwards() {
        let mut source: Box<dyn FrameSource> =
            Box::new(ScriptedSource::from_frames([Frame::new([1, 2, 3, 4])]).finite());
        source.open().unwrap();
        assert!(source.poll().unwrap().is_some());
        assert!(source.poll().unwrap().is_none());
        assert!(source.is_exhausted());
    }
}
