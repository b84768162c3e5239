//! Lifecycle state and outcome of a [`ShutdownHook`](crate::ShutdownHook).

use std::sync::Arc;

use crate::error::ShutdownError;

/// Result of a finished shutdown pass.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Every task settled successfully before the deadline.
    Success,
    /// A task failed, the deadline fired, or the orchestration itself failed.
    Failure(Arc<ShutdownError>),
}

impl Outcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure(_) => 1,
        }
    }

    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&Arc<ShutdownError>> {
        match self {
            Self::Success => None,
            Self::Failure(err) => Some(err),
        }
    }
}

/// Lifecycle state of a hook.
///
/// `Idle → Running` happens at most once; `Completed` is terminal.
#[derive(Debug, Clone, Default)]
pub enum HookState {
    /// No pass has been requested yet.
    #[default]
    Idle,
    /// A pass is in progress.
    Running,
    /// The pass finished with the given outcome.
    Completed(Outcome),
}

impl HookState {
    /// Returns a short stable label (`snake_case`) for use in logs.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed(_) => "completed",
        }
    }
}
