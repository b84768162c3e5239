//! # Shutdown orchestration.
//!
//! [`ShutdownHook`] owns the [`Registry`], the lifecycle [`HookState`] and the
//! [`EventBus`]. One instance is created at process start and shared (behind
//! an `Arc`) with every component that registers cleanup work.
//!
//! ## Pass
//! ```text
//! shutdown()
//!   ├─► Idle? ── no ──► ignored (None)
//!   ├─► state = Running, registry frozen (same critical section)
//!   ├─► publish ShutdownStarted
//!   ├─► snapshot registry, compute order (lifo reverse + stable sort by order)
//!   ├─► timeout(budget, for each task:
//!   │         publish ComponentShutdown { name, order, index }
//!   │         spawn operation, await settlement, stop on first error)
//!   ├─► publish ShutdownEnded { code, error? }
//!   ├─► state = Completed(outcome)
//!   └─► exit(code)
//! ```
//!
//! ## Rules
//! - Tasks never overlap: each operation settles before the next starts.
//! - The budget covers the whole pass, not each task.
//! - When the deadline fires the in-flight operation keeps running detached;
//!   its result is discarded and no further event is published.
//!   [`ShutdownHook::operations_settled`] waits for it.
//! - A failure of the orchestration itself is logged and exits with `1`
//!   without publishing `ShutdownEnded`.

mod plan;
mod state;

use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::broadcast;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::config::HookConfig;
use crate::error::{ConfigError, OrchestrationError, ShutdownError, TaskError};
use crate::events::{Event, EventBus};
use crate::exit::{Exit, ProcessExit};
use crate::registry::Registry;
use crate::task::{Operation, ShutdownTask, TaskOptions};

pub use state::{HookState, Outcome};

/// Coordinates one graceful shutdown pass.
pub struct ShutdownHook {
    config: HookConfig,
    registry: Mutex<Registry>,
    state: Mutex<HookState>,
    bus: EventBus,
    exit: Arc<dyn Exit>,
    operations: TaskTracker,
    finished: CancellationToken,
}

impl ShutdownHook {
    /// Creates a hook that terminates the process when the pass ends.
    #[must_use]
    pub fn new(config: HookConfig) -> Self {
        Self::with_exit(config, Arc::new(ProcessExit))
    }

    /// Creates a hook with a custom exit action.
    #[must_use]
    pub fn with_exit(config: HookConfig, exit: Arc<dyn Exit>) -> Self {
        let bus = EventBus::new(config.bus_capacity);
        Self {
            config,
            registry: Mutex::new(Registry::new()),
            state: Mutex::new(HookState::Idle),
            bus,
            exit,
            operations: TaskTracker::new(),
            finished: CancellationToken::new(),
        }
    }

    /// Construction-time settings.
    #[must_use]
    pub const fn config(&self) -> &HookConfig {
        &self.config
    }

    /// Registers a cleanup operation.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::BlankName`] if an explicit name is blank;
    /// - [`ConfigError::Frozen`] if a pass has already started.
    pub fn add<O: Operation>(&self, operation: O, options: TaskOptions) -> Result<(), ConfigError> {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let task = registry.add(operation, options)?;
        tracing::debug!(name = task.name(), order = task.order(), "registered shutdown task");
        Ok(())
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Subscribes to lifecycle events. Subscribe before the pass starts.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> HookState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolves once the hook reached [`HookState::Completed`].
    pub async fn finished(&self) {
        self.finished.cancelled().await;
    }

    /// Resolves once the pass finished and every operation it spawned
    /// settled, including one left running past the deadline.
    pub async fn operations_settled(&self) {
        self.finished().await;
        self.operations.close();
        self.operations.wait().await;
    }

    /// Invokes the exit action with `code`.
    pub fn exit(&self, code: i32) {
        self.exit.exit(code);
    }

    /// Runs the shutdown pass.
    ///
    /// Only the first call runs a pass and returns its outcome; calls made
    /// while a pass is running or after it finished return `None`. Never
    /// panics or fails: every error ends up in the outcome, the
    /// `ShutdownEnded` event and the exit code.
    pub async fn shutdown(&self) -> Option<Outcome> {
        if !self.begin() {
            tracing::debug!("shutdown already requested, ignoring trigger");
            return None;
        }

        let span = tracing::info_span!(
            "shutdown",
            lifo = self.config.lifo,
            timeout_ms = self.config.timeout_ms
        );
        let started = Instant::now();
        let outcome = match self.run_pass().instrument(span).await {
            Ok(outcome) => {
                self.bus.publish(Event::ShutdownEnded {
                    code: outcome.code(),
                    error: outcome.error().cloned(),
                });
                outcome
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    label = err.as_label(),
                    "unexpected error during shutdown sequence"
                );
                Outcome::Failure(Arc::new(ShutdownError::Orchestration(err)))
            }
        };

        let code = outcome.code();
        tracing::info!(
            code,
            histogram.shutdown_duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "shutdown sequence finished"
        );
        self.complete(outcome.clone());
        self.exit.exit(code);
        Some(outcome)
    }

    /// Moves `Idle → Running` and freezes the registry; returns `false` if a
    /// pass was already requested.
    ///
    /// The registry is frozen while the state lock is held, so no `add` can
    /// succeed once this returns `true`.
    fn begin(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*state, HookState::Idle) {
            return false;
        }
        *state = HookState::Running;
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .freeze();
        true
    }

    fn complete(&self, outcome: Outcome) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = HookState::Completed(outcome);
        self.finished.cancel();
    }

    async fn run_pass(&self) -> Result<Outcome, OrchestrationError> {
        self.bus.publish(Event::ShutdownStarted);

        let snapshot = self
            .registry
            .lock()
            .map_err(|_| OrchestrationError::RegistryPoisoned)?
            .snapshot();
        let plan = plan::execution_order(snapshot, self.config.lifo);
        let budget = self.config.timeout();
        tracing::info!(tasks = plan.len(), "starting shutdown sequence");

        let result = match tokio::time::timeout(budget, self.run_sequence(&plan)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                tracing::warn!(
                    task = err.task(),
                    error = %err,
                    label = err.as_label(),
                    "shutdown task failed, skipping remaining tasks"
                );
                Err(ShutdownError::Task(err))
            }
            Err(_) => {
                tracing::warn!(budget_ms = self.config.timeout_ms, "shutdown sequence timed out");
                Err(ShutdownError::Timeout { budget })
            }
        };

        Ok(match result {
            Ok(()) => Outcome::Success,
            Err(err) => Outcome::Failure(Arc::new(err)),
        })
    }

    async fn run_sequence(&self, plan: &[Arc<ShutdownTask>]) -> Result<(), TaskError> {
        for (index, task) in plan.iter().enumerate() {
            self.bus.publish(Event::ComponentShutdown {
                name: task.shared_name(),
                order: task.order(),
                index,
            });
            tracing::debug!(name = task.name(), order = task.order(), index, "shutting down component");

            let operation = task.operation();
            let settled = self
                .operations
                .spawn(async move { operation.invoke().await })
                .await;
            match settled {
                Ok(Ok(())) => {}
                Ok(Err(source)) => {
                    return Err(TaskError::Failed {
                        task: task.name().to_string(),
                        source,
                    });
                }
                Err(err) => return Err(join_failure(task.name(), err)),
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ShutdownHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownHook")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn join_failure(task: &str, err: JoinError) -> TaskError {
    match err.try_into_panic() {
        Ok(payload) => TaskError::Panicked {
            task: task.to_string(),
            message: panic_message(payload.as_ref()),
        },
        Err(_) => TaskError::Cancelled {
            task: task.to_string(),
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "task panicked with a non-string payload".to_string())
}
