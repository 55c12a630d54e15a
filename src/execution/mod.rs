//! The execution operations.
//!
//! Every operation takes an [`Executor`](crate::executor::Executor) and ends
//! in either a plain `schedule` call or a continuation attached to an
//! existing [`ResultHandle`](crate::handle::ResultHandle):
//!
//! | operation              | returns                             |
//! |------------------------|-------------------------------------|
//! | [`async_execute`]      | `ResultHandle<R>`                   |
//! | [`sync_execute`]       | `Result<R>`                         |
//! | [`post`]               | nothing                             |
//! | [`then_execute`]       | `Result<ResultHandle<R>>`           |
//! | [`bulk_async_execute`] | `Vec<ResultHandle<R>>`              |
//! | [`bulk_sync_execute`]  | `Result<Vec<R>>`                    |
//! | [`bulk_then_execute`]  | `Result<ResultHandle<Vec<R>>>`      |
//!
//! Extra arguments are captured by the closure. A callable fails its handle by
//! panicking; the `try_` variants also take an `Err` return as failure.

mod bulk;
mod shape;
mod submit;
mod then;

pub use bulk::{
    bulk_async_execute, bulk_sync_execute, bulk_then_execute, try_bulk_async_execute,
    try_bulk_sync_execute, wait_all, when_all,
};
pub use shape::Shape;
pub use submit::{async_execute, post, post_with_hint, sync_execute, try_async_execute};
pub use then::then_execute;
