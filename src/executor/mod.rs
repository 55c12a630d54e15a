//! Execution agents.
//!
//! Everything in the execution layer talks to an [`Executor`]: one method to
//! hand over a [`Task`], plus the defaults used to fill in a task's metadata.
//! Three implementations ship with the crate: a work-stealing pool, an inline
//! executor, and a thread-per-task executor.

pub mod cpu_pool;
pub mod dedicated;
pub mod inline;
pub mod panic_handler;
pub mod task;
pub mod worker;

pub use cpu_pool::{CpuPool, ThreadPoolExecutor};
pub use dedicated::ThreadPerTaskExecutor;
pub use inline::InlineExecutor;
pub use panic_handler::{PanicHandler, PanicInfo, PanicStrategy};
pub use task::{Priority, ScheduleHint, StackSize, Task, TaskId};

use std::sync::Arc;

/// A capability that can run deferred work.
///
/// `schedule` is fire-and-forget: the executor owns the task from then on and
/// either runs it once or drops it.
pub trait Executor: Send + Sync {
    fn schedule(&self, task: Task);

    /// Stack size requested for work built by the execution operations.
    fn stack_size(&self) -> StackSize {
        StackSize::Default
    }

    /// Priority given to work built by the execution operations.
    fn priority(&self) -> Priority {
        Priority::Normal
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }

    fn stack_size(&self) -> StackSize {
        (**self).stack_size()
    }

    fn priority(&self) -> Priority {
        (**self).priority()
    }
}

impl<E: Executor + ?Sized> Executor for &E {
    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }

    fn stack_size(&self) -> StackSize {
        (**self).stack_size()
    }

    fn priority(&self) -> Priority {
        (**self).priority()
    }
}
