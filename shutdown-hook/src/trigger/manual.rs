//! Programmatic trigger source.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Trigger, TriggerSource};

/// Sending half of a [`ManualSource`].
#[derive(Debug, Clone)]
pub struct ManualTrigger {
    tx: mpsc::UnboundedSender<Trigger>,
}

impl ManualTrigger {
    /// Fires `trigger`. Returns `false` if the source was dropped.
    pub fn fire(&self, trigger: Trigger) -> bool {
        self.tx.send(trigger).is_ok()
    }
}

/// Channel-backed source fired through a [`ManualTrigger`].
///
/// The source closes once every [`ManualTrigger`] is dropped.
#[derive(Debug)]
pub struct ManualSource {
    rx: mpsc::UnboundedReceiver<Trigger>,
}

impl ManualSource {
    /// Creates a source and its trigger handle.
    #[must_use]
    pub fn channel() -> (ManualTrigger, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ManualTrigger { tx }, Self { rx })
    }
}

#[async_trait]
impl TriggerSource for ManualSource {
    async fn next(&mut self) -> Option<Trigger> {
        self.rx.recv().await
    }

    fn name(&self) -> &'static str {
        "manual"
    }
}
