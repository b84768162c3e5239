//! External programs as cleanup operations.
//!
//! A [`CommandSpec`] describes one `[[tasks]]` entry of the configuration
//! file. [`CommandSpec::operation`] turns it into an [`Operation`] that spawns
//! the program and fails unless it exits successfully.
//!
//! The child is not killed when the aggregate deadline fires: the deadline
//! stops scheduling, and the orchestrator discards the late result.

use std::process::ExitStatus;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;

use crate::error::{BoxError, ConfigError};
use crate::task::{BoxOperationFuture, Operation, TaskOptions};

/// Failure of a command task.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that was spawned.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("'{program}' exited with {status}")]
    Status {
        /// Program that ran.
        program: String,
        /// Exit status reported by the OS.
        status: ExitStatus,
    },
}

/// One command task from the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    /// Task name; generated when omitted.
    #[serde(default)]
    pub name: Option<String>,

    /// Order value; `0` when omitted.
    #[serde(default)]
    pub order: Option<i64>,

    /// Program to execute (looked up in `PATH`).
    pub program: String,

    /// Arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Checks the entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BlankName`] if `name` is present but blank, or
    /// [`ConfigError::Parse`] if `program` is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ConfigError::BlankName);
        }
        if self.program.trim().is_empty() {
            return Err(ConfigError::Parse {
                path: "<tasks>".into(),
                message: "task program must not be blank".to_string(),
            });
        }
        Ok(())
    }

    /// Registration options derived from this entry.
    #[must_use]
    pub fn options(&self) -> TaskOptions {
        let mut options = TaskOptions::new();
        if let Some(name) = &self.name {
            options = options.name(name.clone());
        }
        if let Some(order) = self.order {
            options = options.order(order);
        }
        options
    }

    /// Builds the operation that runs this command.
    #[must_use]
    pub fn operation(&self) -> CommandOperation {
        CommandOperation {
            program: Arc::from(self.program.as_str()),
            args: Arc::from(self.args.as_slice()),
        }
    }
}

/// [`Operation`] spawning an external program.
#[derive(Debug, Clone)]
pub struct CommandOperation {
    program: Arc<str>,
    args: Arc<[String]>,
}

impl Operation for CommandOperation {
    fn invoke(&self) -> BoxOperationFuture {
        let program = Arc::clone(&self.program);
        let args = Arc::clone(&self.args);
        Box::pin(async move {
            tracing::debug!(program = %program, ?args, "running cleanup command");
            let status = Command::new(&*program)
                .args(args.iter())
                .status()
                .await
                .map_err(|source| CommandError::Spawn {
                    program: program.to_string(),
                    source,
                })?;
            if !status.success() {
                return Err(CommandError::Status {
                    program: program.to_string(),
                    status,
                }
                .into());
            }
            Ok::<(), BoxError>(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(program: &str) -> CommandSpec {
        CommandSpec {
            name: None,
            order: None,
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    #[test]
    fn blank_program_is_rejected() {
        assert!(spec(" ").validate().is_err());
        assert!(spec("true").validate().is_ok());
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let err = spec("definitely-not-a-real-program-4f2a")
            .operation()
            .invoke()
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to spawn"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_status_maps_to_result() {
        assert!(spec("true").operation().invoke().await.is_ok());

        let err = spec("false").operation().invoke().await.unwrap_err();
        assert!(err.to_string().contains("'false' exited with"));
    }
}
