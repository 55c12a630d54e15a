use crate::executor::{Priority, Task};
use parking_lot::Mutex;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
struct PriorityTask {
    task: Task,
    priority: Priority,
    seq: u64,
}

impl PartialEq for PriorityTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for PriorityTask {}

impl PartialOrd for PriorityTask {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityTask {
    // BinaryHeap is a max-heap: most urgent priority first, then oldest.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Heap of tasks that were submitted with a non-normal priority.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: Mutex<BinaryHeap<PriorityTask>>,
    seq: AtomicU64,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, task: Task) {
        let priority = task.get_priority();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.heap.lock().push(PriorityTask {
            task,
            priority,
            seq,
        });
    }

    pub fn pop(&self) -> Option<Task> {
        self.heap.lock().pop().map(|pt| pt.task)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub fn peek(&self) -> Option<Priority> {
        self.heap.lock().peek().map(|pt| pt.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(priority: Priority, description: &'static str) -> Task {
        Task::with_priority(|| {}, priority).description(description)
    }

    #[test]
    fn test_priority_queue() {
        let queue = PriorityQueue::new();

        queue.push(task(Priority::Low, "low"));
        queue.push(task(Priority::Realtime, "rt"));
        queue.push(task(Priority::High, "high"));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek(), Some(Priority::Realtime));
        queue.pop();
        assert_eq!(queue.peek(), Some(Priority::High));
        queue.pop();
        assert_eq!(queue.peek(), Some(Priority::Low));
        queue.pop();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fifo_within_priority() {
        let queue = PriorityQueue::new();

        queue.push(task(Priority::High, "first"));
        queue.push(task(Priority::High, "second"));
        queue.push(task(Priority::High, "third"));

        let order: Vec<_> = std::iter::from_fn(|| queue.pop())
            .map(|t| t.get_description())
            .collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }
}
