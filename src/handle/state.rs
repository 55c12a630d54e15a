//! The cell shared by a promise and its handles.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::task::Waker;

const PENDING: u8 = 0;
const READY: u8 = 1;

pub(crate) type Continuation = Box<dyn FnOnce() + Send + 'static>;

enum Slot<T> {
    Empty,
    Filled(Result<T>),
    Taken,
}

struct Inner<T> {
    outcome: Slot<T>,
    continuation: Option<Continuation>,
    wakers: Vec<Waker>,
}

pub(crate) struct SharedState<T> {
    status: AtomicU8,
    attached: AtomicBool,
    inner: Mutex<Inner<T>>,
}

impl<T> SharedState<T> {
    pub fn pending() -> Self {
        Self {
            status: AtomicU8::new(PENDING),
            attached: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                outcome: Slot::Empty,
                continuation: None,
                wakers: Vec::new(),
            }),
        }
    }

    pub fn completed(result: Result<T>) -> Self {
        Self {
            status: AtomicU8::new(READY),
            attached: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                outcome: Slot::Filled(result),
                continuation: None,
                wakers: Vec::new(),
            }),
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.status.load(Ordering::Acquire) == READY
    }

    /// Write the terminal state, then wake waiters and fire the continuation.
    pub fn complete(&self, result: Result<T>) {
        let (continuation, wakers) = {
            let mut inner = self.inner.lock();
            if !matches!(inner.outcome, Slot::Empty) {
                debug_assert!(false, "result handle completed twice");
                return;
            }
            inner.outcome = Slot::Filled(result);
            self.status.store(READY, Ordering::Release);
            (
                inner.continuation.take(),
                std::mem::take(&mut inner.wakers),
            )
        };

        for waker in wakers {
            waker.wake();
        }
        if let Some(continuation) = continuation {
            continuation();
        }
    }

    /// Claim the single continuation slot.
    ///
    /// The callback runs right away if the cell is already ready, otherwise
    /// when it becomes ready. Either way it runs exactly once.
    pub fn attach(&self, continuation: Continuation) -> Result<()> {
        if self
            .attached
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::ContinuationAlreadyAttached);
        }

        let run_now = {
            let mut inner = self.inner.lock();
            if self.is_ready() {
                Some(continuation)
            } else {
                inner.continuation = Some(continuation);
                None
            }
        };

        if let Some(continuation) = run_now {
            continuation();
        }
        Ok(())
    }

    pub fn has_continuation(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Register `waker` unless the cell is already ready. Returns readiness.
    pub fn register_waker(&self, waker: &Waker) -> bool {
        let mut inner = self.inner.lock();
        if self.is_ready() {
            return true;
        }
        if !inner.wakers.iter().any(|w| w.will_wake(waker)) {
            inner.wakers.push(waker.clone());
        }
        false
    }

    /// Move the outcome out. `None` while pending.
    pub fn take(&self) -> Option<Result<T>> {
        let mut inner = self.inner.lock();
        match std::mem::replace(&mut inner.outcome, Slot::Taken) {
            Slot::Empty => {
                inner.outcome = Slot::Empty;
                None
            }
            Slot::Filled(result) => Some(result),
            Slot::Taken => Some(Err(Error::AlreadyRetrieved)),
        }
    }

    pub fn has_error(&self) -> bool {
        matches!(self.inner.lock().outcome, Slot::Filled(Err(_)))
    }
}

impl<T: Clone> SharedState<T> {
    pub fn peek(&self) -> Option<Result<T>> {
        match &self.inner.lock().outcome {
            Slot::Empty => None,
            Slot::Filled(result) => Some(result.clone()),
            Slot::Taken => Some(Err(Error::AlreadyRetrieved)),
        }
    }
}
