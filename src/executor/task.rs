//! Deferred work items and the scheduling hints that travel with them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Priority level for task scheduling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    Realtime = 0,
    High = 1,
    #[default]
    Normal = 2,
    Low = 3,
    Background = 4,
}

/// Requested stack size for the thread that runs a task.
///
/// Pool workers have a fixed stack; executors that create a thread per task
/// use this to size it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StackSize {
    Small,
    #[default]
    Default,
    Medium,
    Large,
    Huge,
}

impl StackSize {
    /// Size in bytes, or `None` to use the platform default.
    pub fn bytes(self) -> Option<usize> {
        match self {
            StackSize::Small => Some(64 * 1024),
            StackSize::Default => None,
            StackSize::Medium => Some(512 * 1024),
            StackSize::Large => Some(2 * 1024 * 1024),
            StackSize::Huge => Some(8 * 1024 * 1024),
        }
    }
}

/// Placement hint for a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScheduleHint {
    #[default]
    None,
    /// Prefer the worker with this index (taken modulo the pool size).
    Worker(usize),
}

/// A deferred work item: a callable bundled with its scheduling metadata.
///
/// Consumed by [`Task::execute`], so it runs at most once.
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) func: Box<dyn FnOnce() + Send + 'static>,
    pub(crate) description: &'static str,
    pub(crate) priority: Priority,
    pub(crate) stack_size: StackSize,
    pub(crate) hint: ScheduleHint,
    pub(crate) spawn_time: Instant,
}

impl Task {
    /// Create a new task with default metadata
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task {
            id: TaskId::next(),
            func: Box::new(f),
            description: "task",
            priority: Priority::Normal,
            stack_size: StackSize::Default,
            hint: ScheduleHint::None,
            spawn_time: Instant::now(),
        }
    }

    /// Create a task with specific priority
    pub fn with_priority<F>(f: F, priority: Priority) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task::new(f).priority(priority)
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn stack_size(mut self, stack_size: StackSize) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub fn hint(mut self, hint: ScheduleHint) -> Self {
        self.hint = hint;
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn get_description(&self) -> &'static str {
        self.description
    }

    pub fn get_priority(&self) -> Priority {
        self.priority
    }

    pub fn get_stack_size(&self) -> StackSize {
        self.stack_size
    }

    pub fn get_hint(&self) -> ScheduleHint {
        self.hint
    }

    pub fn spawn_time(&self) -> Instant {
        self.spawn_time
    }

    /// Execute the task
    pub fn execute(self) {
        (self.func)();
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("priority", &self.priority)
            .field("stack_size", &self.stack_size)
            .field("hint", &self.hint)
            .field("spawn_time", &self.spawn_time)
            .finish()
    }
}
