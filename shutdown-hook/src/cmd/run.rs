//! `shutdown-hook run` command: wait for a trigger and run cleanup tasks.
//!
//! Reads the TOML configuration, registers one command task per `[[tasks]]`
//! entry, subscribes to SIGTERM, SIGINT and `shutdown` lines on stdin, and
//! returns the exit code of the shutdown pass.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use shutdown_hook::{HookConfig, RecordedExit, ShutdownHook, TriggerAdapter, load_config};

/// Overrides applied on top of the `[hook]` section.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    /// Replaces `hook.lifo`.
    pub lifo: Option<bool>,
    /// Replaces `hook.timeout_ms`.
    pub timeout_ms: Option<u64>,
}

impl Overrides {
    fn apply(self, mut config: HookConfig) -> HookConfig {
        if let Some(lifo) = self.lifo {
            config = config.with_lifo(lifo);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }
        config
    }
}

/// Execute the `run` command.
///
/// Returns the exit code of the shutdown pass. The process is not terminated
/// here so the caller can flush telemetry first.
///
/// # Errors
///
/// Returns an error if configuration loading, task registration or signal
/// registration fails.
pub async fn run(config_path: &Path, overrides: Overrides) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let hook_config = overrides.apply(config.hook);
    hook_config.validate()?;

    let exit = Arc::new(RecordedExit::new());
    let hook = Arc::new(ShutdownHook::with_exit(hook_config, exit.clone()));
    for task in &config.tasks {
        hook.add(task.operation(), task.options())?;
    }
    tracing::info!(
        tasks = hook.task_count(),
        lifo = hook.config().lifo,
        timeout_ms = hook.config().timeout_ms,
        "waiting for shutdown trigger"
    );

    let mut adapter = TriggerAdapter::for_process(Arc::clone(&hook))?;
    adapter.register();
    hook.finished().await;

    Ok(exit.last().unwrap_or(1))
}
