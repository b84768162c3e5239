//! Shutdown lifecycle events: data model and broadcast bus.
//!
//! Per pass the hook publishes, in order:
//! ```text
//! ShutdownStarted ──► ComponentShutdown { name, order, index } × N ──► ShutdownEnded { code, error? }
//! ```
//! An orchestration failure ends the pass without `ShutdownEnded`.
//!
//! Observers must subscribe before the pass begins; the bus keeps no history.

mod bus;
mod event;

pub use bus::EventBus;
pub use event::Event;
