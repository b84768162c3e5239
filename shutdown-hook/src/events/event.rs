//! # Events published during a shutdown pass.

use std::sync::Arc;

use crate::error::ShutdownError;

/// Lifecycle milestone of a shutdown pass.
#[derive(Debug, Clone)]
pub enum Event {
    /// The pass started.
    ShutdownStarted,

    /// A task is about to be invoked.
    ComponentShutdown {
        /// Task name.
        name: Arc<str>,
        /// Task order value.
        order: i64,
        /// Zero-based position in the computed execution sequence.
        index: usize,
    },

    /// The pass finished. Published exactly once per pass.
    ShutdownEnded {
        /// Exit code handed to the exit action (`0` or `1`).
        code: i32,
        /// Failure that ended the pass, if any.
        error: Option<Arc<ShutdownError>>,
    },
}

impl Event {
    /// Returns a short stable label (`snake_case`) for use in logs.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::ShutdownStarted => "shutdown_started",
            Self::ComponentShutdown { .. } => "component_shutdown",
            Self::ShutdownEnded { .. } => "shutdown_ended",
        }
    }
}
