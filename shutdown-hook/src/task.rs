//! # Shutdown tasks and the operation abstraction.
//!
//! A [`ShutdownTask`] pairs a cleanup [`Operation`] with a name and an
//! `order` value. Operations are awaitable: each invocation produces a fresh boxed
//! future that settles with `Ok(())` or an error.
//!
//! Any `Fn() -> Fut` closure whose future resolves to `Result<(), E>` is an
//! operation. Synchronous closures are adapted with [`from_sync`].
//!
//! ## Example
//! ```rust
//! use shutdown_hook::{from_sync, HookConfig, ShutdownHook, TaskOptions};
//!
//! let hook = ShutdownHook::new(HookConfig::default());
//! hook.add(|| async { Ok::<_, std::io::Error>(()) }, TaskOptions::new().name("flush"))?;
//! hook.add(from_sync(|| Ok::<_, &str>(())), TaskOptions::new().order(10))?;
//! # Ok::<(), shutdown_hook::ConfigError>(())
//! ```

use std::fmt;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use crate::error::BoxError;

/// Boxed future returned by [`Operation::invoke`].
pub type BoxOperationFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'static>>;

/// Zero-argument cleanup action that settles asynchronously.
pub trait Operation: Send + Sync + 'static {
    /// Starts the operation and returns a future that settles once it is done.
    fn invoke(&self) -> BoxOperationFuture;
}

impl<F, Fut, E> Operation for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError>,
{
    fn invoke(&self) -> BoxOperationFuture {
        let fut = self();
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}

/// Adapts a synchronous closure into an [`Operation`].
///
/// The closure runs when the operation is invoked; the orchestrator does
/// so on the task it spawned for the operation.
pub fn from_sync<F, E>(f: F) -> impl Operation
where
    F: Fn() -> Result<(), E> + Send + Sync + 'static,
    E: Into<BoxError> + Send + 'static,
{
    move || -> Ready<Result<(), E>> { ready(f()) }
}

/// Optional metadata supplied when registering a task.
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    pub(crate) name: Option<String>,
    pub(crate) order: Option<i64>,
}

impl TaskOptions {
    /// Creates empty options: generated name, order `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit task name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the order value; lower values run earlier.
    #[must_use]
    pub const fn order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }
}

/// A registered cleanup operation.
pub struct ShutdownTask {
    name: Arc<str>,
    order: i64,
    operation: Arc<dyn Operation>,
}

impl ShutdownTask {
    pub(crate) fn new(name: Arc<str>, order: i64, operation: Arc<dyn Operation>) -> Self {
        Self {
            name,
            order,
            operation,
        }
    }

    /// Task name, explicit or generated (`anonymous#<k>`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Order value; lower values run earlier.
    #[must_use]
    pub const fn order(&self) -> i64 {
        self.order
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub(crate) fn operation(&self) -> Arc<dyn Operation> {
        Arc::clone(&self.operation)
    }
}

impl fmt::Debug for ShutdownTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownTask")
            .field("name", &self.name)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}
