//! Execution order of a shutdown pass.

use std::sync::Arc;

use crate::task::ShutdownTask;

/// Computes the execution sequence from an insertion-ordered snapshot.
///
/// With `lifo` the snapshot is reversed first; a stable sort by ascending
/// `order` follows, so `lifo` only breaks ties between equal `order` values.
pub(crate) fn execution_order(
    mut tasks: Vec<Arc<ShutdownTask>>,
    lifo: bool,
) -> Vec<Arc<ShutdownTask>> {
    if lifo {
        tasks.reverse();
    }
    tasks.sort_by_key(|task| task.order());
    tasks
}
