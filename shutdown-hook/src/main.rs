//! shutdown-hook CLI
//!
//! Runs ordered cleanup commands when the process receives SIGTERM, SIGINT or
//! a `shutdown` line on stdin, and exits with their aggregate outcome.
//!
//! ```sh
//! shutdown-hook init          # Generate default shutdown-hook.toml
//! shutdown-hook run           # Wait for a trigger, then run cleanup tasks
//! ```

mod cmd;
#[cfg(feature = "telemetry")]
mod telemetry;

use clap::Parser;
use cmd::{Cli, Commands};

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    cmd::load_env(None);
    let cli = Cli::parse();

    #[cfg(feature = "telemetry")]
    let telemetry = telemetry::Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_log_level(cli.log_level.clone())
        .register();
    #[cfg(not(feature = "telemetry"))]
    init_logging(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::Init { output, force } => cmd::init::run(&output, force).map(|()| 0),
        Commands::Run {
            config,
            lifo,
            timeout_ms,
        } => cmd::run::run(&config, cmd::run::Overrides { lifo, timeout_ms }).await,
    };

    // Flush exporters before leaving; `process::exit` skips destructors.
    #[cfg(feature = "telemetry")]
    drop(telemetry);

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "telemetry"))]
fn init_logging(level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.unwrap_or("info").into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
