//! veda-exec - executor customization layer
//!
//! A small set of operations that submit work to any [`Executor`] and hand
//! back a [`ResultHandle`] to observe it: single-shot, blocking, fire-and-forget,
//! continuation and bulk variants. The executor only has to know how to run a
//! [`Task`]; handles, continuations and aggregation live here.
//!
//! # Quick Start
//!
//! ```no_run
//! use veda_exec::prelude::*;
//!
//! let exec = ThreadPoolExecutor::with_threads(4).unwrap();
//!
//! let answer = async_execute(&exec, || 6 * 7);
//! let doubled = then_execute(&exec, answer, |h| h.wait_and_get().unwrap_or(0) * 2).unwrap();
//! assert_eq!(doubled.wait_and_get(), Ok(84));
//!
//! let squares = bulk_sync_execute(&exec, 0..5, |x| x * x).unwrap();
//! assert_eq!(squares, vec![0, 1, 4, 9, 16]);
//! ```
//!
//! # Features
//!
//! - **Pluggable executors**: implement one `schedule` method
//! - **Continuations**: single-attach, always run through the executor
//! - **Bulk operations**: shape-ordered fan-out with first-index-wins errors
//! - **Helping waits**: blocking on a pool worker runs other queued work
//! - **Logical tasks**: drive futures on any executor with `spawn_async`
//! - **Bundled executors**: work-stealing pool, inline, thread-per-task

#![warn(missing_debug_implementations)]

pub mod async_bridge;
pub mod config;
pub mod error;
pub mod execution;
pub mod executor;
pub mod handle;
pub mod prelude;
pub mod runtime;
pub mod scheduler;
pub mod telemetry;
pub mod util;

pub use async_bridge::{block_on, spawn_async};
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use execution::{
    async_execute, bulk_async_execute, bulk_sync_execute, bulk_then_execute, post,
    post_with_hint, sync_execute, then_execute, try_async_execute, try_bulk_async_execute,
    try_bulk_sync_execute, wait_all, when_all, Shape,
};
pub use executor::{
    Executor, InlineExecutor, Priority, ScheduleHint, StackSize, Task, ThreadPerTaskExecutor,
    ThreadPoolExecutor,
};
pub use handle::{promise, Promise, ResultHandle};
pub use runtime::{current_executor, init, init_with_config, shutdown};
pub use telemetry::{Metrics, MetricsSnapshot};
