//! Wakers used by blocking waits.

use std::sync::Arc;
use std::task::{Wake, Waker};
use std::thread::{self, Thread};

thread_local! {
    static CURRENT: Waker = Arc::new(ThreadWaker::new(thread::current())).into();
}

/// Waker that unparks one OS thread.
#[derive(Debug)]
pub struct ThreadWaker {
    thread: Thread,
}

impl ThreadWaker {
    pub fn new(thread: Thread) -> Self {
        Self { thread }
    }

    /// A waker for the calling thread.
    ///
    /// Every call on one thread returns a clone of the same waker, so
    /// repeated registrations compare equal under [`Waker::will_wake`].
    pub fn current() -> Waker {
        CURRENT.with(Waker::clone)
    }
}

impl Wake for ThreadWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref()
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.thread.unpark();
    }
}
