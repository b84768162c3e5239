//! # Registry of shutdown tasks.
//!
//! Holds tasks in insertion order, which is the base ordering every shutdown
//! pass starts from. The registry is pure data plus validation; ordering and
//! execution live in [`ShutdownHook`](crate::ShutdownHook).
//!
//! The registry is frozen in the same step that starts a pass; later
//! registrations fail with [`ConfigError::Frozen`] and the orchestrator runs
//! one snapshot of what was registered before.

use std::sync::Arc;

use crate::error::ConfigError;
use crate::task::{Operation, ShutdownTask, TaskOptions};

/// Insertion-ordered collection of [`ShutdownTask`]s.
#[derive(Debug, Default)]
pub struct Registry {
    tasks: Vec<Arc<ShutdownTask>>,
    frozen: bool,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task built from `operation` and `options`.
    ///
    /// Without an explicit name the task is called `anonymous#<k>`, where `k`
    /// is its 1-based registration sequence number.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::BlankName`] if an explicit name is blank;
    /// - [`ConfigError::Frozen`] if a shutdown pass has started.
    pub fn add<O: Operation>(
        &mut self,
        operation: O,
        options: TaskOptions,
    ) -> Result<&ShutdownTask, ConfigError> {
        let name = match options.name {
            Some(name) if name.trim().is_empty() => return Err(ConfigError::BlankName),
            Some(name) => name,
            None => format!("anonymous#{}", self.tasks.len() + 1),
        };
        if self.frozen {
            return Err(ConfigError::Frozen { name });
        }

        let task = ShutdownTask::new(
            Arc::from(name),
            options.order.unwrap_or_default(),
            Arc::new(operation),
        );
        self.tasks.push(Arc::new(task));
        Ok(self.tasks[self.tasks.len() - 1].as_ref())
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no task has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns `true` once a shutdown pass has started.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Iterates tasks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ShutdownTask> {
        self.tasks.iter().map(|task| &**task)
    }

    /// Rejects every later registration with [`ConfigError::Frozen`].
    pub(crate) const fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Insertion-ordered copy of the registered tasks.
    pub(crate) fn snapshot(&self) -> Vec<Arc<ShutdownTask>> {
        self.tasks.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::from_sync;

    fn noop() -> impl Operation {
        from_sync(|| Ok::<_, &str>(()))
    }

    #[test]
    fn generated_names_follow_registration_sequence() {
        let mut registry = Registry::new();
        registry.add(noop(), TaskOptions::new()).unwrap();
        registry
            .add(noop(), TaskOptions::new().name("db").order(5))
            .unwrap();
        let third = registry.add(noop(), TaskOptions::new().order(-1)).unwrap();
        assert_eq!(third.name(), "anonymous#3");
        assert_eq!(third.order(), -1);

        let names: Vec<_> = registry.iter().map(ShutdownTask::name).collect();
        assert_eq!(names, ["anonymous#1", "db", "anonymous#3"]);
        assert_eq!(registry.iter().nth(1).map(ShutdownTask::order), Some(5));
    }

    #[test]
    fn duplicate_names_are_allowed() {
        let mut registry = Registry::new();
        registry.add(noop(), TaskOptions::new().name("cache")).unwrap();
        registry.add(noop(), TaskOptions::new().name("cache")).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut registry = Registry::new();
        let err = registry
            .add(noop(), TaskOptions::new().name("  "))
            .unwrap_err();
        assert!(matches!(err, ConfigError::BlankName));
        assert!(registry.is_empty());
    }

    #[test]
    fn frozen_registry_rejects_new_tasks() {
        let mut registry = Registry::new();
        registry.add(noop(), TaskOptions::new()).unwrap();

        registry.freeze();
        assert_eq!(registry.snapshot().len(), 1);
        assert!(registry.is_frozen());

        let err = registry.add(noop(), TaskOptions::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Frozen { ref name } if name == "anonymous#2"));
        assert_eq!(registry.len(), 1);
    }
}
