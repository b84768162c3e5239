//! Control messages as a trigger source.
//!
//! A parent process asks for shutdown by writing the line `shutdown` to the
//! child's stdin (or any other stream handed to [`MessageSource::new`]).
//! The line must equal `shutdown` exactly once its `\n` or `\r\n`
//! terminator is removed; other lines are ignored. End of stream closes the
//! source.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use super::{Trigger, TriggerSource};

/// Payload that requests a shutdown.
pub const SHUTDOWN_MESSAGE: &str = "shutdown";

/// Reads newline-delimited control messages.
#[derive(Debug)]
pub struct MessageSource<R> {
    lines: Lines<R>,
}

impl<R> MessageSource<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    /// Reads messages from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl MessageSource<BufReader<Stdin>> {
    /// Reads messages from the process' stdin.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> TriggerSource for MessageSource<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn next(&mut self) -> Option<Trigger> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) if line == SHUTDOWN_MESSAGE => return Some(Trigger::Message),
                Ok(Some(line)) => tracing::trace!(%line, "ignoring control message"),
                Ok(None) => return None,
                Err(err) => {
                    tracing::warn!(error = %err, "control message stream failed");
                    return None;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "messages"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn only_exact_shutdown_lines_trigger() {
        let input: &[u8] = b"hello\nShutdown\n  shutdown  \nshutdown\r\nbye\nshutdown\n";
        let mut source = MessageSource::new(input);

        assert_eq!(source.next().await, Some(Trigger::Message));
        assert_eq!(source.next().await, Some(Trigger::Message));
        assert_eq!(source.next().await, None);
    }
}
