//! Result handles.
//!
//! A [`Promise`] is the single producer of a value; every [`ResultHandle`]
//! cloned from the pair observes the same cell. The cell goes from pending to
//! ready exactly once, with either a value or an [`Error`].
//!
//! Waiting never parks a pool worker while the pool has work: on a worker
//! thread [`ResultHandle::wait`] runs queued tasks until the handle is ready.
//! Inside a logical task, `.await` the handle instead.

mod state;

use crate::async_bridge::waker::ThreadWaker;
use crate::error::{Error, Result};
use crate::executor::worker;
use state::{Continuation, SharedState};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;
use std::time::{Duration, Instant};

/// Create a connected producer/consumer pair.
pub fn promise<T>() -> (Promise<T>, ResultHandle<T>) {
    let state = Arc::new(SharedState::pending());
    (
        Promise {
            state: Some(state.clone()),
        },
        ResultHandle { state },
    )
}

/// Write side of a result handle.
///
/// Dropping a promise without setting it makes its handles ready with
/// [`Error::BrokenPromise`].
pub struct Promise<T> {
    state: Option<Arc<SharedState<T>>>,
}

impl<T> Promise<T> {
    pub fn set_value(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn set_error(self, error: Error) {
        self.complete(Err(error));
    }

    pub fn complete(mut self, result: Result<T>) {
        if let Some(state) = self.state.take() {
            state.complete(result);
        }
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            state.complete(Err(Error::BrokenPromise));
        }
    }
}

impl<T> std::fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Promise").finish_non_exhaustive()
    }
}

/// Read side of an asynchronous result.
///
/// Clones share one cell. The value is moved out by the first
/// [`wait_and_get`](Self::wait_and_get) or [`try_take`](Self::try_take) on any
/// clone; [`wait_cloned`](Self::wait_cloned) reads without moving.
pub struct ResultHandle<T> {
    state: Arc<SharedState<T>>,
}

impl<T> Clone for ResultHandle<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> ResultHandle<T> {
    /// A handle that is already ready with `value`.
    pub fn ready(value: T) -> Self {
        Self {
            state: Arc::new(SharedState::completed(Ok(value))),
        }
    }

    /// A handle that is already ready with `error`.
    pub fn failed(error: Error) -> Self {
        Self {
            state: Arc::new(SharedState::completed(Err(error))),
        }
    }

    /// Lock-free readiness check.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn has_error(&self) -> bool {
        self.is_ready() && self.state.has_error()
    }

    pub fn has_continuation(&self) -> bool {
        self.state.has_continuation()
    }

    /// Take the outcome if ready, without waiting.
    pub fn try_take(&self) -> Option<Result<T>> {
        self.state.take()
    }

    /// Wait until ready.
    pub fn wait(&self) {
        self.wait_until(None);
    }

    /// Wait until ready or until `timeout` elapses. Returns readiness.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.wait_until(Some(Instant::now() + timeout))
    }

    /// Wait, then move the outcome out.
    pub fn wait_and_get(self) -> Result<T> {
        self.wait();
        self.state.take().unwrap_or(Err(Error::AlreadyRetrieved))
    }

    /// Claim the continuation slot; see [`then_execute`](crate::execution::then_execute).
    pub(crate) fn attach(&self, continuation: Continuation) -> Result<()> {
        self.state.attach(continuation)
    }

    fn wait_until(&self, deadline: Option<Instant>) -> bool {
        if self.is_ready() {
            return true;
        }

        let waker = ThreadWaker::current();
        if self.state.register_waker(&waker) {
            return true;
        }

        let expired = || deadline.is_some_and(|d| Instant::now() >= d);

        if worker::help_until(&|| self.is_ready() || expired()) {
            return self.is_ready();
        }

        while !self.is_ready() {
            match deadline {
                Some(d) => {
                    let now = Instant::now();
                    if now >= d {
                        return false;
                    }
                    thread::park_timeout(d - now);
                }
                None => thread::park(),
            }
        }
        true
    }
}

impl<T: Clone> ResultHandle<T> {
    /// Wait, then read a copy of the outcome, leaving it in place.
    pub fn wait_cloned(&self) -> Result<T> {
        self.wait();
        self.state.peek().unwrap_or(Err(Error::AlreadyRetrieved))
    }
}

impl<T> Future for ResultHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.is_ready() || self.state.register_waker(cx.waker()) {
            return Poll::Ready(self.state.take().unwrap_or(Err(Error::AlreadyRetrieved)));
        }
        Poll::Pending
    }
}

impl<T> std::fmt::Debug for ResultHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultHandle")
            .field("ready", &self.is_ready())
            .field("continuation", &self.has_continuation())
            .finish()
    }
}
