//! Logical tasks: futures driven cooperatively by any executor.
//!
//! Each poll is one [`Task`] handed to the executor. A pending poll gives the
//! worker back; the task's waker submits the next poll. A logical task is in
//! the executor's queues at most once at a time.

use crate::error::Error;
use crate::executor::panic_handler::PanicInfo;
use crate::executor::{Executor, Task};
use crate::handle::{promise, ResultHandle};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Wake, Waker};

const IDLE: u8 = 0;
const SCHEDULED: u8 = 1;
const RUNNING: u8 = 2;
const NOTIFIED: u8 = 3;
const COMPLETE: u8 = 4;

struct LogicalTask<E> {
    state: AtomicU8,
    future: Mutex<Option<BoxFuture<'static, ()>>>,
    exec: E,
}

impl<E> LogicalTask<E>
where
    E: Executor + 'static,
{
    fn submit(self: &Arc<Self>) {
        let this = self.clone();
        let task = Task::new(move || this.poll_once())
            .description("spawn_async")
            .priority(self.exec.priority())
            .stack_size(self.exec.stack_size());
        self.exec.schedule(task);
    }

    fn poll_once(self: &Arc<Self>) {
        self.state.store(RUNNING, Ordering::Release);

        let waker = Waker::from(self.clone());
        let mut cx = Context::from_waker(&waker);

        let done = {
            let mut slot = self.future.lock();
            let done = match slot.as_mut() {
                Some(future) => future.as_mut().poll(&mut cx).is_ready(),
                None => true,
            };
            if done {
                *slot = None;
            }
            done
        };

        if done {
            self.state.store(COMPLETE, Ordering::Release);
            return;
        }

        if self
            .state
            .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // woken while polling; queue behind whatever else is waiting
            self.state.store(SCHEDULED, Ordering::Release);
            self.submit();
        }
    }
}

impl<E> Wake for LogicalTask<E>
where
    E: Executor + 'static,
{
    fn wake(self: Arc<Self>) {
        self.wake_by_ref()
    }

    fn wake_by_ref(self: &Arc<Self>) {
        loop {
            match self.state.load(Ordering::Acquire) {
                IDLE => {
                    if self
                        .state
                        .compare_exchange(IDLE, SCHEDULED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        self.submit();
                        return;
                    }
                }
                RUNNING => {
                    if self
                        .state
                        .compare_exchange(RUNNING, NOTIFIED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return;
                    }
                }
                _ => return,
            }
        }
    }
}

/// Run `future` as a logical task on `exec`.
///
/// Awaiting other handles inside the future suspends only this task. A panic
/// while polling becomes [`Error::Panicked`] on the returned handle.
pub fn spawn_async<E, F>(exec: &E, future: F) -> ResultHandle<F::Output>
where
    E: Executor + Clone + 'static,
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let (promise, handle) = promise();

    let body = async move {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(value) => promise.set_value(value),
            Err(payload) => promise.set_error(Error::from(PanicInfo::from_payload(payload))),
        }
    };

    let task = Arc::new(LogicalTask {
        state: AtomicU8::new(SCHEDULED),
        future: Mutex::new(Some(body.boxed())),
        exec: exec.clone(),
    });
    task.submit();

    handle
}

/// Block on a future in the current thread
///
/// This is a convenience wrapper around futures::executor::block_on. On a
/// pool worker it blocks the worker; prefer [`spawn_async`] there.
pub fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    futures::executor::block_on(future)
}
