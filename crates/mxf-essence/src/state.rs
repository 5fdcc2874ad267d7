//! Writer/reader lifecycle state machine (§4.11).
//!
//! ```text
//! BEGIN → INIT      (file opened for write)
//! INIT  → READY     (essence descriptor set, source stream configured)
//! READY → RUNNING   (first WriteFrame)
//! RUNNING → RUNNING (subsequent WriteFrames; periodic partition break)
//! RUNNING → FINAL   (Finalize)
//! ```

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Begin,
    Init,
    Ready,
    Running,
    Final,
}

impl WriterState {
    fn name(self) -> &'static str {
        match self {
            WriterState::Begin => "Begin",
            WriterState::Init => "Init",
            WriterState::Ready => "Ready",
            WriterState::Running => "Running",
            WriterState::Final => "Final",
        }
    }

    pub fn require(self, expected: &[WriterState], attempted: &'static str) -> Result<()> {
        if expected.contains(&self) {
            Ok(())
        } else {
            Err(Error::State { state: self.name(), attempted })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Begin,
    Open,
    Closed,
}

impl ReaderState {
    fn name(self) -> &'static str {
        match self {
            ReaderState::Begin => "Begin",
            ReaderState::Open => "Open",
            ReaderState::Closed => "Closed",
        }
    }

    pub fn require(self, expected: &[ReaderState], attempted: &'static str) -> Result<()> {
        if expected.contains(&self) {
            Ok(())
        } else {
            Err(Error::State { state: self.name(), attempted })
        }
    }
}
