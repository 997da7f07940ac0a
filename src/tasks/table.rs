//! # Task table: explicit name → task map.
//!
//! Units are registered by task *name*. The table is where those names resolve:
//! the caller defines each task up front, and an unknown name is reported as
//! [`RuntimeError::TaskNotFound`] at registration time, before any unit runs.

use std::collections::HashMap;

use crate::error::RuntimeError;
use crate::tasks::TaskRef;

/// Registration map from task name to task definition.
#[derive(Default, Clone)]
pub struct TaskTable {
    tasks: HashMap<String, TaskRef>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `task` under its own name, returning the definition it replaced.
    pub fn define(&mut self, task: TaskRef) -> Option<TaskRef> {
        self.tasks.insert(task.name().to_string(), task)
    }

    /// Resolves `name` to its definition.
    pub fn resolve(&self, name: &str) -> Result<TaskRef, RuntimeError> {
        self.tasks
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::TaskNotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Returns sorted list of defined task names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{TaskFn, UnitContext};

    fn noop(name: &'static str) -> TaskRef {
        TaskFn::arc(name, |_ctx: UnitContext| async { Ok(()) })
    }

    #[test]
    fn resolves_defined_tasks() {
        let mut table = TaskTable::new();
        assert!(table.define(noop("b")).is_none());
        assert!(table.define(noop("a")).is_none());
        assert!(table.define(noop("a")).is_some());

        assert_eq!(table.names(), vec!["a", "b"]);
        assert_eq!(table.resolve("a").unwrap().name(), "a");
    }

    #[test]
    fn unknown_names_are_configuration_errors() {
        let table = TaskTable::new();
        let err = table.resolve("ghost").err().expect("must fail");
        assert_eq!(err.as_label(), "runtime_task_not_found");
        assert_eq!(err.to_string(), "task \"ghost\" not found");
    }
}
