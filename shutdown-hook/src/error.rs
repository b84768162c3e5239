//! Error types for registration, task execution and the shutdown pass.
//!
//! - [`ConfigError`]: invalid registration or configuration input; raised
//!   synchronously and never reaches the orchestrator.
//! - [`TaskError`]: a cleanup operation failed while the pass was running.
//! - [`ShutdownError`]: the reason a pass ended in failure; attached to
//!   [`Event::ShutdownEnded`](crate::Event::ShutdownEnded).
//! - [`OrchestrationError`]: failure inside the orchestration logic itself.
//!
//! Every enum exposes `as_label` for use as a stable log field.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Boxed error produced by a cleanup operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Invalid registration or configuration input.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicit task name was empty or whitespace only.
    #[error("shutdown task name must not be blank")]
    BlankName,

    /// A task was registered after the shutdown pass had already started.
    #[error("cannot register '{name}': shutdown already started")]
    Frozen {
        /// Name the rejected task would have had.
        name: String,
    },

    /// The aggregate timeout budget was zero.
    #[error("timeout budget must be greater than zero")]
    ZeroTimeout,

    /// Configuration file could not be read.
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse config '{}': {message}", path.display())]
    Parse {
        /// Path of the offending file (`<inline>` for string input).
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (`snake_case`) for use in logs.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::BlankName => "config_blank_name",
            Self::Frozen { .. } => "config_frozen",
            Self::ZeroTimeout => "config_zero_timeout",
            Self::Read { .. } => "config_read",
            Self::Parse { .. } => "config_parse",
        }
    }
}

/// A cleanup operation failed while the shutdown pass was running.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TaskError {
    /// The operation settled with an error.
    ///
    /// Displays exactly as the underlying error so observers see the
    /// operation's own message.
    #[error("{source}")]
    Failed {
        /// Name of the failed task.
        task: String,
        /// Error returned by the operation.
        source: BoxError,
    },

    /// The operation panicked; the payload is normalized into a message.
    #[error("{message}")]
    Panicked {
        /// Name of the failed task.
        task: String,
        /// Panic payload rendered as text.
        message: String,
    },

    /// The runtime tore the operation down before it settled.
    #[error("task '{task}' was cancelled before it settled")]
    Cancelled {
        /// Name of the cancelled task.
        task: String,
    },
}

impl TaskError {
    /// Returns a short stable label (`snake_case`) for use in logs.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::Failed { .. } => "task_failed",
            Self::Panicked { .. } => "task_panicked",
            Self::Cancelled { .. } => "task_cancelled",
        }
    }

    /// Name of the task that failed.
    #[must_use]
    pub fn task(&self) -> &str {
        match self {
            Self::Failed { task, .. } | Self::Panicked { task, .. } | Self::Cancelled { task } => {
                task
            }
        }
    }
}

/// Failure inside the orchestration logic, outside any task.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// The registry lock was poisoned while taking the task snapshot.
    #[error("shutdown registry lock poisoned")]
    RegistryPoisoned,
}

impl OrchestrationError {
    /// Returns a short stable label (`snake_case`) for use in logs.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::RegistryPoisoned => "orchestration_registry_poisoned",
        }
    }
}

/// Reason a shutdown pass ended in failure.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// A task failed; remaining tasks were skipped.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// The aggregate deadline fired before every task settled.
    #[error("Shutdown operation timed out after {}ms", budget.as_millis())]
    Timeout {
        /// Configured aggregate budget.
        budget: Duration,
    },

    /// The orchestration logic itself failed.
    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),
}

impl ShutdownError {
    /// Returns a short stable label (`snake_case`) for use in logs.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::Task(err) => err.as_label(),
            Self::Timeout { .. } => "shutdown_timeout",
            Self::Orchestration(err) => err.as_label(),
        }
    }
}
