//! # Trigger adapter: external stimuli to `ShutdownHook::shutdown`.
//!
//! A [`TriggerSource`] is a stream of [`Trigger`]s. The [`TriggerAdapter`]
//! owns its sources and listener tasks explicitly, so it can be built, torn
//! down and registered again without touching process-global state beyond
//! what its sources install.
//!
//! ```text
//! SignalSource  (SIGTERM, SIGINT) ──┐
//! MessageSource ("shutdown" line) ──┼──► listener ──► spawn hook.shutdown()
//! ManualSource  (ManualTrigger)   ──┘                (duplicates ignored by the hook)
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use shutdown_hook::{HookConfig, ShutdownHook, TriggerAdapter};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let hook = Arc::new(ShutdownHook::new(HookConfig::default()));
//!     let mut adapter = TriggerAdapter::for_process(Arc::clone(&hook))?;
//!     adapter.register();
//!     hook.finished().await;
//!     Ok(())
//! }
//! ```

mod manual;
mod message;
mod signal;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::hook::ShutdownHook;

pub use manual::{ManualSource, ManualTrigger};
pub use message::{MessageSource, SHUTDOWN_MESSAGE};
pub use signal::SignalSource;

/// Stimulus requesting a shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// SIGTERM.
    Terminate,
    /// SIGINT or Ctrl+C.
    Interrupt,
    /// The `shutdown` control message.
    Message,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Terminate => "SIGTERM",
            Self::Interrupt => "SIGINT",
            Self::Message => "shutdown message",
        })
    }
}

/// Stream of shutdown stimuli.
#[async_trait]
pub trait TriggerSource: Send + 'static {
    /// Waits for the next stimulus; `None` once the source is exhausted.
    ///
    /// Must be cancel safe: the adapter drops a pending call on deregistration.
    async fn next(&mut self) -> Option<Trigger>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Subscribes sources to a [`ShutdownHook`].
pub struct TriggerAdapter {
    hook: Arc<ShutdownHook>,
    pending: Vec<Box<dyn TriggerSource>>,
    listeners: TaskTracker,
    token: CancellationToken,
}

impl TriggerAdapter {
    /// Creates an adapter without sources.
    #[must_use]
    pub fn new(hook: Arc<ShutdownHook>) -> Self {
        Self {
            hook,
            pending: Vec::new(),
            listeners: TaskTracker::new(),
            token: CancellationToken::new(),
        }
    }

    /// Creates an adapter for SIGTERM, SIGINT and `shutdown` lines on stdin.
    ///
    /// # Errors
    ///
    /// Returns an [`std::io::Error`] if signal registration fails.
    pub fn for_process(hook: Arc<ShutdownHook>) -> Result<Self, std::io::Error> {
        Ok(Self::new(hook)
            .with_source(SignalSource::try_new()?)
            .with_source(MessageSource::stdin()))
    }

    /// Adds a source to be subscribed by the next [`register`](Self::register).
    #[must_use]
    pub fn with_source(mut self, source: impl TriggerSource) -> Self {
        self.add_source(source);
        self
    }

    /// Adds a source to be subscribed by the next [`register`](Self::register).
    pub fn add_source(&mut self, source: impl TriggerSource) {
        self.pending.push(Box::new(source));
    }

    /// Number of running listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Spawns one listener per pending source.
    ///
    /// Every stimulus spawns a call to [`ShutdownHook::shutdown`]; the hook
    /// runs at most one pass no matter how many arrive. Must be called
    /// within a tokio runtime.
    pub fn register(&mut self) {
        for source in self.pending.drain(..) {
            tracing::debug!(source = source.name(), "subscribing shutdown trigger");
            self.listeners.spawn(listen(
                source,
                Arc::clone(&self.hook),
                self.token.clone(),
                self.listeners.clone(),
            ));
        }
    }

    /// Stops every listener and waits for them, including shutdown passes
    /// they started.
    ///
    /// Sources are consumed; add new ones before registering again.
    pub async fn deregister(&mut self) {
        self.token.cancel();
        self.listeners.close();
        self.listeners.wait().await;
        self.token = CancellationToken::new();
        self.listeners = TaskTracker::new();
    }
}

impl fmt::Debug for TriggerAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerAdapter")
            .field("pending", &self.pending.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

async fn listen(
    mut source: Box<dyn TriggerSource>,
    hook: Arc<ShutdownHook>,
    token: CancellationToken,
    listeners: TaskTracker,
) {
    let name = source.name();
    loop {
        let trigger = tokio::select! {
            () = token.cancelled() => break,
            trigger = source.next() => trigger,
        };
        let Some(trigger) = trigger else {
            tracing::debug!(source = name, "shutdown trigger source closed");
            break;
        };

        tracing::info!(source = name, %trigger, "shutdown requested");
        let hook = Arc::clone(&hook);
        listeners.spawn(async move {
            hook.shutdown().await;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::HookConfig;
    use crate::exit::RecordedExit;
    use crate::task::{TaskOptions, from_sync};

    fn counting_hook() -> (Arc<ShutdownHook>, Arc<RecordedExit>, Arc<AtomicUsize>) {
        let exit = Arc::new(RecordedExit::new());
        let hook = Arc::new(ShutdownHook::with_exit(HookConfig::default(), exit.clone()));
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        hook.add(
            from_sync(move || {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(())
            }),
            TaskOptions::new(),
        )
        .unwrap();
        (hook, exit, calls)
    }

    #[tokio::test]
    async fn duplicate_triggers_run_one_pass() {
        let (hook, exit, calls) = counting_hook();
        let (trigger, source) = ManualSource::channel();
        let mut adapter = TriggerAdapter::new(Arc::clone(&hook)).with_source(source);
        adapter.register();
        assert_eq!(adapter.listener_count(), 1);

        assert!(trigger.fire(Trigger::Terminate));
        assert!(trigger.fire(Trigger::Interrupt));
        assert!(trigger.fire(Trigger::Message));
        hook.finished().await;
        drop(trigger);
        adapter.deregister().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(exit.codes(), [0]);
    }

    #[tokio::test]
    async fn control_message_triggers_shutdown() {
        let (hook, exit, calls) = counting_hook();
        let input: &[u8] = b"status\nshutdown\n";
        let mut adapter =
            TriggerAdapter::new(Arc::clone(&hook)).with_source(MessageSource::new(input));
        adapter.register();

        hook.finished().await;
        adapter.deregister().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(exit.codes(), [0]);
    }

    #[tokio::test]
    async fn deregistered_adapter_ignores_triggers_until_registered_again() {
        let (hook, exit, calls) = counting_hook();
        let (first, source) = ManualSource::channel();
        let mut adapter = TriggerAdapter::new(Arc::clone(&hook)).with_source(source);
        adapter.register();
        adapter.deregister().await;
        assert_eq!(adapter.listener_count(), 0);

        first.fire(Trigger::Terminate);
        tokio::task::yield_now().await;
        assert!(matches!(hook.state(), crate::HookState::Idle));

        let (second, source) = ManualSource::channel();
        adapter.add_source(source);
        adapter.register();
        second.fire(Trigger::Interrupt);
        hook.finished().await;
        adapter.deregister().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(exit.codes(), [0]);
    }

    #[test]
    fn trigger_display_names_the_stimulus() {
        assert_eq!(Trigger::Terminate.to_string(), "SIGTERM");
        assert_eq!(Trigger::Interrupt.to_string(), "SIGINT");
        assert_eq!(Trigger::Message.to_string(), "shutdown message");
    }
}
