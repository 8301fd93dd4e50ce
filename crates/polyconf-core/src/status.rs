//! Resolution status state machine

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layer::Outcome;

/// Lifecycle of one resolution.
///
/// `Init` → `Running` → one of `Success`, `Degraded`, `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Init,
    Running,
    Success,
    Degraded,
    Failed,
}

impl Status {
    /// Whether the resolution has finished.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Degraded | Status::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Init => "INIT",
            Status::Running => "RUNNING",
            Status::Success => "SUCCESS",
            Status::Degraded => "DEGRADED",
            Status::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incremental status bookkeeping.
///
/// Only ever moves toward worse outcomes: a recorded non-ok layer rules out
/// `Success` for good, and a fatal failure pins the result to `Failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StatusTracker {
    ok_layers: usize,
    non_ok_layers: usize,
    fatal: bool,
}

impl StatusTracker {
    pub(crate) fn observe(&mut self, outcome: &Outcome) {
        if outcome.is_ok() {
            self.ok_layers += 1;
        } else {
            self.non_ok_layers += 1;
        }
    }

    pub(crate) fn mark_fatal(&mut self) {
        self.fatal = true;
    }

    /// The terminal status the resolution would end in right now.
    pub(crate) fn terminal(&self) -> Status {
        if self.fatal || self.ok_layers == 0 {
            Status::Failed
        } else if self.non_ok_layers > 0 {
            Status::Degraded
        } else {
            Status::Success
        }
    }
}
