use super::{Executor, Priority, StackSize, Task};

/// Runs every task immediately on the thread that schedules it.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor {
    priority: Priority,
}

impl InlineExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(priority: Priority) -> Self {
        Self { priority }
    }
}

impl Executor for InlineExecutor {
    fn schedule(&self, task: Task) {
        tracing::trace!(task = ?task.id(), description = task.get_description(), "inline");
        task.execute();
    }

    fn stack_size(&self) -> StackSize {
        StackSize::Default
    }

    fn priority(&self) -> Priority {
        self.priority
    }
}
