//! Terminal exit actions.
//!
//! The hook hands the final exit code of a pass to an [`Exit`]
//! implementation. [`ProcessExit`] terminates the process; [`RecordedExit`]
//! only records the code so the caller decides when and how to leave.

use std::sync::{Mutex, PoisonError};

/// Terminal action receiving the exit code of a shutdown pass.
pub trait Exit: Send + Sync + 'static {
    /// Handles the exit code (`0` on success, `1` on failure).
    fn exit(&self, code: i32);
}

/// Terminates the host process with the pass' exit code.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExit;

impl Exit for ProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}

/// Records exit codes instead of terminating.
#[derive(Debug, Default)]
pub struct RecordedExit {
    codes: Mutex<Vec<i32>>,
}

impl RecordedExit {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every code received so far, oldest first.
    #[must_use]
    pub fn codes(&self) -> Vec<i32> {
        self.codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent code, if any.
    #[must_use]
    pub fn last(&self) -> Option<i32> {
        self.codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }
}

impl Exit for RecordedExit {
    fn exit(&self, code: i32) {
        self.codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(code);
    }
}
