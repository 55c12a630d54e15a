use super::{Executor, Priority, StackSize, Task};
use std::sync::Arc;
use std::thread;

/// Spawns a fresh OS thread for every task, sized by the task's [`StackSize`].
///
/// A task whose thread cannot be spawned is dropped, which breaks the promise
/// it carries.
#[derive(Debug, Clone)]
pub struct ThreadPerTaskExecutor {
    name: Arc<str>,
    stack_size: StackSize,
}

impl ThreadPerTaskExecutor {
    pub fn new() -> Self {
        Self {
            name: Arc::from("veda-exec-task"),
            stack_size: StackSize::Default,
        }
    }

    pub fn with_name<S: AsRef<str>>(name: S) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            stack_size: StackSize::Default,
        }
    }

    /// Stack size requested for work built by the execution operations.
    pub fn with_stack_size(mut self, stack_size: StackSize) -> Self {
        self.stack_size = stack_size;
        self
    }
}

impl Default for ThreadPerTaskExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ThreadPerTaskExecutor {
    fn schedule(&self, task: Task) {
        let mut builder = thread::Builder::new().name(format!("{}-{}", self.name, task.id().as_u64()));
        if let Some(bytes) = task.get_stack_size().bytes() {
            builder = builder.stack_size(bytes);
        }

        let id = task.id();
        if let Err(e) = builder.spawn(move || task.execute()) {
            tracing::warn!(task = ?id, error = %e, "thread spawn failed, task dropped");
        }
    }

    fn stack_size(&self) -> StackSize {
        self.stack_size
    }

    fn priority(&self) -> Priority {
        Priority::Normal
    }
}
