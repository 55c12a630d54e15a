// worker thread stuff
use super::panic_handler::PanicHandler;
use super::task::{ScheduleHint, Task};
use crate::scheduler::PriorityQueue;
use crate::telemetry::Metrics;
use crate::util::Backoff;
use crossbeam_deque::{Injector, Steal, Stealer, Worker as WorkerQueue};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub type WorkerId = usize;

thread_local! {
    // Set while a pool worker is inside its run loop.
    static CURRENT_WORKER: RefCell<Option<Rc<Worker>>> = const { RefCell::new(None) };
}

// stats for each worker
#[derive(Debug, Default)]
pub struct WorkerState {
    pub tasks_executed: AtomicU64,
    pub tasks_stolen: AtomicU64,
    pub tasks_helped: AtomicU64,
}

/// Queues and flags shared by every worker of one pool.
pub(crate) struct PoolShared {
    pub injector: Injector<Task>,
    pub inboxes: Vec<Injector<Task>>,
    pub priority_queue: PriorityQueue,
    pub stealers: Vec<Stealer<Task>>,
    pub shutdown: AtomicBool,
    pub pending_tasks: AtomicUsize,
    pub metrics: Arc<Metrics>,
    pub panic_handler: PanicHandler,
}

impl PoolShared {
    pub fn push(&self, task: Task, num_threads: usize) -> Option<WorkerId> {
        self.pending_tasks.fetch_add(1, Ordering::Relaxed);
        self.metrics.record_task_scheduled();

        match task.get_hint() {
            ScheduleHint::Worker(n) => {
                let id = n % num_threads;
                self.inboxes[id].push(task);
                Some(id)
            }
            ScheduleHint::None if task.get_priority() == crate::executor::Priority::Normal => {
                self.injector.push(task);
                None
            }
            ScheduleHint::None => {
                self.priority_queue.push(task);
                None
            }
        }
    }
}

pub(crate) struct Worker {
    pub id: WorkerId,
    pub local_queue: WorkerQueue<Task>,
    pub state: Arc<WorkerState>,
    shared: Arc<PoolShared>,
}

impl Worker {
    pub fn new(id: WorkerId, local_queue: WorkerQueue<Task>, shared: Arc<PoolShared>) -> Self {
        Self {
            id,
            local_queue,
            state: Arc::new(WorkerState::default()),
            shared,
        }
    }

    // main loop
    pub fn run(self) {
        let worker = Rc::new(self);
        CURRENT_WORKER.with(|cell| *cell.borrow_mut() = Some(worker.clone()));
        tracing::debug!(worker = worker.id, "worker started");

        let mut backoff_cnt = 0;

        loop {
            // Priority: local -> inbox -> priority queue -> global -> steal
            if let Some(task) = worker.find_task() {
                backoff_cnt = 0;
                worker.run_task(task);
            } else if worker.shared.shutdown.load(Ordering::Acquire) {
                // queues drained, nothing submitted before shutdown is lost
                break;
            } else {
                worker.backoff(&mut backoff_cnt);
            }
        }

        CURRENT_WORKER.with(|cell| *cell.borrow_mut() = None);
        tracing::debug!(
            worker = worker.id,
            executed = worker.state.tasks_executed.load(Ordering::Relaxed),
            "worker stopped"
        );
    }

    fn find_task(&self) -> Option<Task> {
        // 1. Check local queue first (best cache locality)
        if let Some(task) = self.local_queue.pop() {
            return Some(task);
        }

        // 2. Work pinned to this worker by a schedule hint, one at a time so
        // it never lands in the stealable local queue
        loop {
            match self.shared.inboxes[self.id].steal() {
                Steal::Success(task) => return Some(task),
                Steal::Empty => break,
                Steal::Retry => continue,
            }
        }

        // 3. Check priority queue for non-normal priorities
        if let Some(task) = self.shared.priority_queue.pop() {
            return Some(task);
        }

        // 4. Check global injector queue
        if let Some(task) = steal_from(&self.shared.injector, &self.local_queue) {
            return Some(task);
        }

        // 5. Steal from other workers
        self.try_steal_from_workers()
    }

    fn try_steal_from_workers(&self) -> Option<Task> {
        use rand::seq::SliceRandom;
        use rand::thread_rng;

        let stealers = &self.shared.stealers;
        if stealers.is_empty() {
            return None;
        }

        let mut indices: Vec<usize> = (0..stealers.len()).collect();
        indices.shuffle(&mut thread_rng());

        for &idx in &indices {
            if idx == self.id {
                continue;
            }

            loop {
                match stealers[idx].steal_batch_and_pop(&self.local_queue) {
                    Steal::Success(task) => {
                        self.state.tasks_stolen.fetch_add(1, Ordering::Relaxed);
                        self.shared.metrics.record_task_stolen();
                        return Some(task);
                    }
                    Steal::Empty => break,
                    Steal::Retry => continue,
                }
            }
        }

        None
    }

    fn run_task(&self, task: Task) {
        let tid = task.id();
        let start = Instant::now();

        let result = self.shared.panic_handler.execute(|| task.execute());

        let duration_ns = start.elapsed().as_nanos() as u64;
        self.shared.pending_tasks.fetch_sub(1, Ordering::Relaxed);

        match result {
            Ok(()) => self.shared.metrics.record_task_execution(duration_ns),
            Err(info) => {
                tracing::trace!(task = ?tid, message = %info.message, "panic escaped task");
                self.shared.metrics.record_task_panic();
            }
        }

        self.state.tasks_executed.fetch_add(1, Ordering::Relaxed);
    }

    fn backoff(&self, count: &mut u32) {
        const MAX_SPINS: u32 = 10;
        const MAX_YIELDS: u32 = 20;

        *count += 1;

        if *count <= MAX_SPINS {
            let spins = (*count).min(6);
            for _ in 0..(1 << spins) {
                std::hint::spin_loop();
            }
        } else if *count <= MAX_YIELDS {
            thread::yield_now();
        } else {
            thread::park_timeout(Duration::from_micros(100));
        }
    }
}

fn steal_from(injector: &Injector<Task>, local: &WorkerQueue<Task>) -> Option<Task> {
    loop {
        match injector.steal_batch_and_pop(local) {
            Steal::Success(task) => return Some(task),
            Steal::Empty => return None,
            Steal::Retry => continue,
        }
    }
}

/// True when the calling thread is a pool worker.
pub fn on_worker_thread() -> bool {
    CURRENT_WORKER.with(|cell| cell.borrow().is_some())
}

/// Run queued pool work on the current worker until `ready` returns true.
///
/// Returns `false` without doing anything when called off the pool. Between
/// tasks the worker parks briefly; whoever makes `ready` true should unpark
/// this thread.
pub(crate) fn help_until(ready: &dyn Fn() -> bool) -> bool {
    let worker = match CURRENT_WORKER.with(|cell| cell.borrow().clone()) {
        Some(worker) => worker,
        None => return false,
    };

    let mut backoff = Backoff::new();
    while !ready() {
        if let Some(task) = worker.find_task() {
            backoff.reset();
            worker.state.tasks_helped.fetch_add(1, Ordering::Relaxed);
            worker.run_task(task);
        } else if backoff.is_completed() {
            thread::park_timeout(Duration::from_micros(50));
        } else {
            backoff.spin();
        }
    }

    true
}
