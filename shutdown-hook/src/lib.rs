//! # shutdown-hook
//!
//! Ordered, deadline-bounded graceful shutdown for long-running processes.
//!
//! Components register cleanup operations on one shared [`ShutdownHook`].
//! When a trigger arrives (SIGTERM, SIGINT, or a `shutdown` control message)
//! the hook runs every operation one after another, lowest `order` first,
//! bounded by a single aggregate timeout, and hands the resulting exit code to
//! an [`Exit`] action.
//!
//! ## Architecture
//! ```text
//!  SignalSource / MessageSource / ManualSource
//!                     │
//!                     ▼
//!              TriggerAdapter ──► ShutdownHook::shutdown()   (at most one pass)
//!                                     │
//!                                     ├─► Registry snapshot (frozen)
//!                                     ├─► order: lifo reverse + stable sort by `order`
//!                                     ├─► run tasks sequentially within the budget
//!                                     ├─► EventBus: ShutdownStarted, ComponentShutdown×N, ShutdownEnded
//!                                     └─► Exit::exit(0 | 1)
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use shutdown_hook::{HookConfig, RecordedExit, ShutdownHook, TaskOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let exit = Arc::new(RecordedExit::new());
//!     let config = HookConfig::default().with_timeout(Duration::from_secs(5));
//!     let hook = ShutdownHook::with_exit(config, exit.clone());
//!
//!     hook.add(|| async { Ok::<_, std::io::Error>(()) }, TaskOptions::new().name("db"))?;
//!     hook.add(|| async { Ok::<_, std::io::Error>(()) }, TaskOptions::new().order(-1))?;
//!
//!     let outcome = hook.shutdown().await;
//!     assert_eq!(outcome.map(|o| o.code()), Some(0));
//!     assert_eq!(exit.codes(), [0]);
//!     Ok(())
//! }
//! ```

mod command;
mod config;
mod error;
mod events;
mod exit;
mod hook;
mod registry;
mod task;
mod trigger;

// ---- Public re-exports ----

pub use command::{CommandError, CommandOperation, CommandSpec};
pub use config::{Config, HookConfig, generate_default_config, load_config, load_config_from_str};
pub use error::{BoxError, ConfigError, OrchestrationError, ShutdownError, TaskError};
pub use events::{Event, EventBus};
pub use exit::{Exit, ProcessExit, RecordedExit};
pub use hook::{HookState, Outcome, ShutdownHook};
pub use registry::Registry;
pub use task::{BoxOperationFuture, Operation, ShutdownTask, TaskOptions, from_sync};
pub use trigger::{
    ManualSource, ManualTrigger, MessageSource, SHUTDOWN_MESSAGE, SignalSource, Trigger,
    TriggerAdapter, TriggerSource,
};
