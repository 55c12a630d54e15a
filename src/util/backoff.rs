//! Spin-then-yield backoff for helping waits.

use std::hint::spin_loop;
use std::thread;

/// Escalates from exponential spinning to yielding. Once
/// [`is_completed`](Backoff::is_completed) reports true the caller should
/// park instead of calling [`spin`](Backoff::spin) again.
#[derive(Debug, Default)]
pub struct Backoff {
    step: u32,
}

impl Backoff {
    const SPIN_LIMIT: u32 = 6;
    const YIELD_LIMIT: u32 = 10;

    pub fn new() -> Self {
        Self { step: 0 }
    }

    /// Back to the cheapest phase, after useful work was found.
    pub fn reset(&mut self) {
        self.step = 0;
    }

    pub fn spin(&mut self) {
        if self.step <= Self::SPIN_LIMIT {
            for _ in 0..(1u32 << self.step) {
                spin_loop();
            }
        } else {
            thread::yield_now();
        }

        if self.step <= Self::YIELD_LIMIT {
            self.step += 1;
        }
    }

    pub fn is_completed(&self) -> bool {
        self.step > Self::YIELD_LIMIT
    }
}
