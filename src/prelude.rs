pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::execution::{
    async_execute, bulk_async_execute, bulk_sync_execute, bulk_then_execute, post,
    post_with_hint, sync_execute, then_execute, try_async_execute, try_bulk_async_execute,
    try_bulk_sync_execute, wait_all, when_all, Shape,
};
pub use crate::executor::{
    Executor, InlineExecutor, Priority, ScheduleHint, StackSize, Task, ThreadPerTaskExecutor,
    ThreadPoolExecutor,
};
pub use crate::handle::{promise, Promise, ResultHandle};
pub use crate::telemetry::{Metrics, MetricsSnapshot};
pub use crate::{current_executor, init, init_with_config, shutdown};

pub use crate::async_bridge::{block_on, spawn_async};
