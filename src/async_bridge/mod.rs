pub mod spawn;
pub mod waker;

pub use spawn::{block_on, spawn_async};
pub use waker::ThreadWaker;
