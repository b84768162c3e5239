//! Configuration loading and default template generation.
//!
//! This module provides:
//!
//! - [`HookConfig`]: construction-time settings of a [`ShutdownHook`](crate::ShutdownHook).
//! - [`Config`]: the TOML file model used by the `shutdown-hook` binary,
//!   holding hook settings plus the command tasks to run.
//! - [`load_config`] / [`load_config_from_str`]: read, parse and validate.
//! - [`generate_default_config`]: produces a commented TOML template.
//!
//! # Configuration File Format
//!
//! ```toml
//! [hook]
//! lifo = false
//! timeout_ms = 10000
//!
//! [[tasks]]
//! name = "flush-cache"
//! order = 0
//! program = "redis-cli"
//! args = ["SAVE"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::CommandSpec;
use crate::error::ConfigError;

/// Settings fixed when a [`ShutdownHook`](crate::ShutdownHook) is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookConfig {
    /// Reverse insertion order before sorting by `order`; only affects ties.
    #[serde(default)]
    pub lifo: bool,

    /// Aggregate budget for the whole pass, in milliseconds. Default: 10000.
    #[serde(default = "HookConfig::default_timeout_ms")]
    pub timeout_ms: u64,

    /// Event bus capacity. Default: 1024.
    #[serde(default = "HookConfig::default_bus_capacity")]
    pub bus_capacity: usize,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            lifo: false,
            timeout_ms: Self::default_timeout_ms(),
            bus_capacity: Self::default_bus_capacity(),
        }
    }
}

impl HookConfig {
    const fn default_timeout_ms() -> u64 {
        10_000
    }

    const fn default_bus_capacity() -> usize {
        1024
    }

    /// Sets the LIFO tie-break.
    #[must_use]
    pub const fn with_lifo(mut self, lifo: bool) -> Self {
        self.lifo = lifo;
        self
    }

    /// Sets the aggregate timeout budget.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Aggregate timeout budget.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] if the budget is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// File configuration for the `shutdown-hook` binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Hook settings.
    #[serde(default)]
    pub hook: HookConfig,

    /// Command tasks, registered in file order.
    #[serde(default)]
    pub tasks: Vec<CommandSpec>,
}

/// Load configuration from a TOML file at the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, path.to_path_buf())
}

/// Load configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or validated.
pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    parse(content, PathBuf::from("<inline>"))
}

fn parse(content: &str, path: PathBuf) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
        path,
        message: e.message().to_string(),
    })?;
    config.hook.validate()?;
    for task in &config.tasks {
        task.validate()?;
    }
    Ok(config)
}

/// Generate a default TOML configuration template.
#[must_use]
pub fn generate_default_config() -> String {
    String::from(
        r#"# shutdown-hook configuration

[hook]
# Reverse registration order among tasks that share the same `order`.
lifo = false
# Budget for the whole shutdown sequence, in milliseconds.
# Can also be set via SHUTDOWN_HOOK_TIMEOUT_MS.
timeout_ms = 10000

# ── Cleanup tasks ───────────────────────────────────────────────────
# Tasks run one after another, lowest `order` first; ties keep file
# order (or reverse file order with `lifo = true`). A non-zero exit
# status fails the sequence and skips the remaining tasks.

[[tasks]]
name = "announce"
program = "echo"
args = ["shutting down"]

[[tasks]]
name = "sync-disks"
order = 10
program = "sync"
"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_file() {
        let config = load_config_from_str("").unwrap();
        assert!(!config.hook.lifo);
        assert_eq!(config.hook.timeout(), Duration::from_secs(10));
        assert_eq!(config.hook.bus_capacity, 1024);
        assert!(config.tasks.is_empty());
    }

    #[test]
    fn default_template_parses() {
        let config = load_config_from_str(&generate_default_config()).unwrap();
        assert_eq!(config.tasks.len(), 2);
        assert_eq!(config.tasks[1].order, Some(10));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = load_config_from_str("[hook]\ntimeout_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout));
    }

    #[test]
    fn non_numeric_order_is_a_parse_error() {
        let err = load_config_from_str(
            r#"
            [[tasks]]
            program = "true"
            order = "first"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = load_config_from_str("[hook]\ntimeout = 5\n").unwrap_err();
        assert_eq!(err.as_label(), "config_parse");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_config(Path::new("/nonexistent/shutdown-hook.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
