use super::panic_handler::PanicHandler;
use super::task::{Priority, StackSize, Task};
use super::worker::{PoolShared, Worker, WorkerId};
use super::Executor;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::scheduler::PriorityQueue;
use crate::telemetry::{Metrics, MetricsSnapshot};
use crossbeam_deque::{Injector, Worker as WorkerQueue};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[cfg(target_os = "linux")]
fn pin_thread_to_core(core_id: usize) {
    // SAFETY: cpu_set_t is plain data and is fully initialized before the call.
    unsafe {
        let mut cpuset: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_SET(core_id, &mut cpuset);
        let result = libc::sched_setaffinity(
            0, // current thread
            std::mem::size_of::<libc::cpu_set_t>(),
            &cpuset,
        );
        if result != 0 {
            tracing::error!(
                thread = std::thread::current().name().unwrap_or("unknown"),
                core = core_id,
                "failed to pin worker"
            );
        }
    }
}

/// A fixed set of work-stealing worker threads.
pub struct CpuPool {
    workers: Vec<WorkerHandle>,
    shared: Arc<PoolShared>,
    num_threads: usize,
    next_wake: AtomicUsize,
    // held for reading while a task is pushed, for writing while the
    // shutdown flag flips, so no push lands after the workers start exiting
    gate: RwLock<()>,
}

struct WorkerHandle {
    id: WorkerId,
    thread: Option<JoinHandle<()>>,
    unparker: thread::Thread,
}

impl CpuPool {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let num_threads = config.worker_threads();
        if num_threads == 0 {
            return Err(Error::config("need at least 1 thread"));
        }

        let queues: Vec<WorkerQueue<Task>> =
            (0..num_threads).map(|_| WorkerQueue::new_fifo()).collect();
        let stealers = queues.iter().map(|q| q.stealer()).collect();

        let shared = Arc::new(PoolShared {
            injector: Injector::new(),
            inboxes: (0..num_threads).map(|_| Injector::new()).collect(),
            priority_queue: PriorityQueue::new(),
            stealers,
            shutdown: AtomicBool::new(false),
            pending_tasks: AtomicUsize::new(0),
            metrics: Arc::new(Metrics::new()),
            panic_handler: PanicHandler::new(config.panic_strategy),
        });

        let mut handles = Vec::with_capacity(num_threads);

        for (id, queue) in queues.into_iter().enumerate() {
            let worker = Worker::new(id, queue, shared.clone());
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);

            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let pin_workers = config.pin_workers;
            let spawned = builder.spawn(move || {
                // Pin worker to core if requested
                #[cfg(target_os = "linux")]
                if pin_workers {
                    pin_thread_to_core(id);
                }
                #[cfg(not(target_os = "linux"))]
                let _ = pin_workers;

                worker.run();
            });

            let thread = match spawned {
                Ok(thread) => thread,
                Err(e) => {
                    // stop the workers that did start
                    shared.shutdown.store(true, Ordering::Release);
                    for handle in &mut handles {
                        stop_worker(handle);
                    }
                    return Err(Error::executor(format!("spawn failed: {}", e)));
                }
            };

            let unparker = thread.thread().clone();

            handles.push(WorkerHandle {
                id,
                thread: Some(thread),
                unparker,
            });
        }

        tracing::debug!(threads = num_threads, prefix = %config.thread_name_prefix, "pool started");

        Ok(Self {
            workers: handles,
            shared,
            num_threads,
            next_wake: AtomicUsize::new(0),
            gate: RwLock::new(()),
        })
    }

    /// Queue `task` for the workers.
    ///
    /// After [`shutdown`](Self::shutdown) the task is dropped instead, which
    /// breaks any promise it carries.
    pub fn submit(&self, task: Task) {
        let target = {
            let guard = self.gate.read();
            if self.shared.shutdown.load(Ordering::Acquire) {
                tracing::debug!(task = ?task.id(), "pool shut down, task dropped");
                // the promise's continuation may submit here again
                drop(guard);
                drop(task);
                return;
            }
            self.shared.push(task, self.num_threads)
        };

        // Wake the worker that owns the task, or the next one in turn
        let id = target
            .unwrap_or_else(|| self.next_wake.fetch_add(1, Ordering::Relaxed) % self.num_threads);
        if let Some(worker) = self.workers.get(id) {
            worker.unparker.unpark();
        }
    }

    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Task::new(f));
    }

    pub fn pending_tasks(&self) -> usize {
        self.shared.pending_tasks.load(Ordering::Relaxed)
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.shared.metrics
    }

    /// Panics that escaped posted work, as counted by the pool's handler.
    pub fn panic_count(&self) -> usize {
        self.shared.panic_handler.panic_count()
    }

    pub fn shutdown(&mut self) {
        {
            let _gate = self.gate.write();
            if self.shared.shutdown.swap(true, Ordering::AcqRel) {
                return;
            }
        }
        tracing::debug!(pending = self.pending_tasks(), "pool shutting down");

        for worker in &mut self.workers {
            stop_worker(worker);
        }
    }
}

fn stop_worker(worker: &mut WorkerHandle) {
    // wake it up to check the shutdown flag
    worker.unparker.unpark();

    // the last handle can be dropped by one of the pool's own tasks
    if worker.unparker.id() == thread::current().id() {
        worker.thread.take();
        return;
    }

    if let Some(thread) = worker.thread.take() {
        if thread.join().is_err() {
            tracing::warn!(worker = worker.id, "worker exited with a panic");
        }
    }
}

impl Drop for CpuPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for CpuPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuPool")
            .field("num_threads", &self.num_threads)
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}

/// Cloneable executor backed by a [`CpuPool`].
///
/// The pool shuts down, after draining its queues, when the last clone is
/// dropped.
#[derive(Debug, Clone)]
pub struct ThreadPoolExecutor {
    pool: Arc<CpuPool>,
    priority: Priority,
    stack_size: StackSize,
}

impl ThreadPoolExecutor {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::from_pool(Arc::new(CpuPool::new(config)?)))
    }

    pub fn with_threads(num_threads: usize) -> Result<Self> {
        let config = Config::builder().num_threads(num_threads).build()?;
        Self::new(&config)
    }

    pub fn from_pool(pool: Arc<CpuPool>) -> Self {
        Self {
            pool,
            priority: Priority::Normal,
            stack_size: StackSize::Default,
        }
    }

    /// A handle to the same pool whose generated work carries `priority`.
    pub fn with_priority(&self, priority: Priority) -> Self {
        Self {
            priority,
            ..self.clone()
        }
    }

    pub fn with_stack_size(&self, stack_size: StackSize) -> Self {
        Self {
            stack_size,
            ..self.clone()
        }
    }

    pub fn pool(&self) -> &Arc<CpuPool> {
        &self.pool
    }

    pub fn num_threads(&self) -> usize {
        self.pool.num_threads()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.pool.metrics().snapshot()
    }
}

impl Executor for ThreadPoolExecutor {
    fn schedule(&self, task: Task) {
        self.pool.submit(task);
    }

    fn stack_size(&self) -> StackSize {
        self.stack_size
    }

    fn priority(&self) -> Priority {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ScheduleHint;
    use std::sync::mpsc;
    use std::time::Duration;

    fn pool(threads: usize) -> CpuPool {
        let config = Config::builder().num_threads(threads).build().unwrap();
        CpuPool::new(&config).unwrap()
    }

    #[test]
    fn test_runs_submitted_tasks() {
        let pool = pool(2);
        let (tx, rx) = mpsc::channel();

        for i in 0..10 {
            let tx = tx.clone();
            pool.execute(move || {
                let _ = tx.send(i);
            });
        }

        let mut got: Vec<i32> = (0..10)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        got.sort();
        assert_eq!(got, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_hint_targets_worker() {
        let config = Config::builder()
            .num_threads(3)
            .thread_name_prefix("hinted")
            .build()
            .unwrap();
        let pool = CpuPool::new(&config).unwrap();
        let (tx, rx) = mpsc::channel();

        pool.submit(
            Task::new(move || {
                let _ = tx.send(thread::current().name().map(str::to_string));
            })
            .hint(ScheduleHint::Worker(4)),
        );

        // 4 % 3 == 1; the inbox is only read by its owner
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!(name, "hinted-1");
    }

    #[test]
    fn test_shutdown_drains_queue() {
        let mut pool = pool(1);
        let (tx, rx) = mpsc::channel();

        for i in 0..100 {
            let tx = tx.clone();
            pool.execute(move || {
                let _ = tx.send(i);
            });
        }
        pool.shutdown();
        drop(tx);

        assert_eq!(rx.iter().count(), 100);
        assert_eq!(pool.pending_tasks(), 0);
    }

    #[test]
    fn test_submit_after_shutdown_breaks_promise() {
        let mut pool = pool(1);
        pool.shutdown();

        let (p, handle) = crate::handle::promise();
        pool.submit(Task::new(move || p.set_value(1)));

        assert!(handle.wait_timeout(Duration::from_secs(5)));
        assert_eq!(handle.wait_and_get(), Err(crate::error::Error::BrokenPromise));
        assert_eq!(pool.pending_tasks(), 0);
    }

    #[test]
    fn test_posted_panic_is_contained() {
        let config = Config::builder()
            .num_threads(1)
            .panic_strategy(crate::executor::PanicStrategy::Isolate)
            .build()
            .unwrap();
        let pool = CpuPool::new(&config).unwrap();
        let (tx, rx) = mpsc::channel();

        pool.execute(|| panic!("posted"));
        pool.execute(move || {
            let _ = tx.send(());
        });

        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(pool.panic_count(), 1);
    }
}
