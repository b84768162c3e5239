//! CLI definitions and command implementations for `shutdown-hook`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

pub mod init;
pub mod run;

/// Loads a `.env` file into the process environment.
///
/// Runs before [`Cli`] is parsed and telemetry is installed, so env-backed
/// options, `RUST_LOG` and `OTEL_*` all see its values. Variables already set
/// in the environment win. `None` searches the current directory and its
/// parents.
pub fn load_env(path: Option<&Path>) {
    let _ = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
}

/// Run ordered cleanup commands when the process is asked to stop.
#[derive(Debug, Parser)]
#[command(name = "shutdown-hook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log filter used when `RUST_LOG` is not set (e.g. `debug`).
    #[arg(long, global = true, env = "SHUTDOWN_HOOK_LOG")]
    pub log_level: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a default TOML configuration file.
    Init {
        /// Output path for the configuration file.
        #[arg(short, long, default_value = "shutdown-hook.toml")]
        output: PathBuf,

        /// Overwrite the file if it already exists.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Wait for SIGTERM, SIGINT or a `shutdown` line on stdin, then run the
    /// configured cleanup tasks and exit with their outcome.
    Run {
        /// Path to the TOML configuration file.
        #[arg(short, long, env = "SHUTDOWN_HOOK_CONFIG", default_value = "shutdown-hook.toml")]
        config: PathBuf,

        /// Reverse registration order among tasks sharing an `order` value.
        #[arg(long, env = "SHUTDOWN_HOOK_LIFO")]
        lifo: Option<bool>,

        /// Aggregate timeout budget in milliseconds.
        #[arg(long, env = "SHUTDOWN_HOOK_TIMEOUT_MS")]
        timeout_ms: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotenv_values_reach_env_backed_options() {
        let dir = std::env::temp_dir().join(format!("shutdown-hook-env-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let env_file = dir.join(".env");
        std::fs::write(
            &env_file,
            "SHUTDOWN_HOOK_CONFIG=custom.toml\nSHUTDOWN_HOOK_TIMEOUT_MS=2500\n",
        )
        .unwrap();

        load_env(Some(&env_file));
        let cli = Cli::try_parse_from(["shutdown-hook", "run"]).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        let Commands::Run {
            config, timeout_ms, ..
        } = cli.command
        else {
            panic!("expected the run subcommand");
        };
        assert_eq!(config, PathBuf::from("custom.toml"));
        assert_eq!(timeout_ms, Some(2500));
    }
}
