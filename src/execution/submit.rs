use crate::error::Result;
use crate::executor::panic_handler::capture;
use crate::executor::{Executor, ScheduleHint, Task};
use crate::handle::{promise, ResultHandle};

/// Build a work item carrying the executor's default metadata.
pub(crate) fn work_item<E, F>(exec: &E, description: &'static str, f: F) -> Task
where
    E: Executor + ?Sized,
    F: FnOnce() + Send + 'static,
{
    Task::new(f)
        .description(description)
        .priority(exec.priority())
        .stack_size(exec.stack_size())
}

pub(crate) fn submit<E, F, R>(exec: &E, description: &'static str, f: F) -> ResultHandle<R>
where
    E: Executor + ?Sized,
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    submit_fallible(exec, description, move || Ok(f()))
}

/// Like [`submit`], but an `Err` from `f` becomes the handle's error.
pub(crate) fn submit_fallible<E, F, R>(
    exec: &E,
    description: &'static str,
    f: F,
) -> ResultHandle<R>
where
    E: Executor + ?Sized,
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    let (promise, handle) = promise();
    exec.schedule(work_item(exec, description, move || {
        promise.complete(capture(f).and_then(|r| r))
    }));
    handle
}

/// Run `f` on `exec` and return a handle to its outcome.
///
/// Returns as soon as the work item is handed over. A panic in `f` is stored
/// in the handle as [`Error::Panicked`](crate::Error::Panicked). Whatever `f`
/// returns is the value, a `Result` included; use [`try_async_execute`] to
/// have an `Err` fail the handle.
pub fn async_execute<E, F, R>(exec: &E, f: F) -> ResultHandle<R>
where
    E: Executor + ?Sized,
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    submit(exec, "async_execute", f)
}

/// [`async_execute`] for a fallible `f`: `Err(e)` fails the handle with `e`.
pub fn try_async_execute<E, F, R>(exec: &E, f: F) -> ResultHandle<R>
where
    E: Executor + ?Sized,
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    submit_fallible(exec, "async_execute", f)
}

/// Run `f` on `exec` and wait for its outcome.
///
/// On a pool worker the wait runs other queued work; it does not park the
/// worker while there is something to do.
pub fn sync_execute<E, F, R>(exec: &E, f: F) -> Result<R>
where
    E: Executor + ?Sized,
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    submit(exec, "sync_execute", f).wait_and_get()
}

/// Run `f` on `exec` with no way to observe its outcome.
pub fn post<E, F>(exec: &E, f: F)
where
    E: Executor + ?Sized,
    F: FnOnce() + Send + 'static,
{
    post_with_hint(exec, ScheduleHint::None, f)
}

/// Like [`post`], steering placement with `hint`.
pub fn post_with_hint<E, F>(exec: &E, hint: ScheduleHint, f: F)
where
    E: Executor + ?Sized,
    F: FnOnce() + Send + 'static,
{
    let task = work_item(exec, "post", move || {
        // nobody holds a handle, so a panic can only be reported
        if let Err(e) = capture(f) {
            tracing::warn!(error = %e, "posted work failed");
        }
    })
    .hint(hint);
    exec.schedule(task);
}
