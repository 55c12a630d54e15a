//! Queue structures used by the bundled thread pool.

pub mod priority;

pub use priority::PriorityQueue;
