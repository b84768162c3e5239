//! OS termination signals as a trigger source.
//!
//! [`SignalSource`] listens for SIGTERM and SIGINT on Unix and for Ctrl+C
//! elsewhere. Unix listeners are installed when the source is created, so a
//! signal arriving before the adapter polls the source is not lost.

use async_trait::async_trait;
#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

use super::{Trigger, TriggerSource};

/// Handles SIGTERM / SIGINT / Ctrl+C.
#[derive(Debug)]
pub struct SignalSource {
    #[cfg(unix)]
    sigterm: Signal,
    #[cfg(unix)]
    sigint: Signal,
}

impl SignalSource {
    /// Installs the signal listeners.
    ///
    /// # Errors
    ///
    /// Returns an [`std::io::Error`] if signal registration fails.
    #[cfg(unix)]
    pub fn try_new() -> Result<Self, std::io::Error> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    /// Installs the signal listeners.
    ///
    /// # Errors
    ///
    /// Never fails on this platform; Ctrl+C is registered lazily.
    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    pub fn try_new() -> Result<Self, std::io::Error> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) -> Option<Trigger> {
        tokio::select! {
            received = self.sigterm.recv() => received.map(|()| Trigger::Terminate),
            received = self.sigint.recv() => received.map(|()| Trigger::Interrupt),
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> Option<Trigger> {
        tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|()| Trigger::Interrupt)
    }
}

#[async_trait]
impl TriggerSource for SignalSource {
    async fn next(&mut self) -> Option<Trigger> {
        self.recv().await
    }

    fn name(&self) -> &'static str {
        "signals"
    }
}
