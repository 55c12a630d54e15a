use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use veda_exec::prelude::*;

/// Runs tasks inline and records what it was asked to run.
#[derive(Clone, Default)]
struct Recording {
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Executor for Recording {
    fn schedule(&self, task: Task) {
        self.log.lock().push(task.get_description());
        task.execute();
    }
}

#[test]
fn test_global_runtime() {
    veda_exec::shutdown();
    veda_exec::init().unwrap();

    let exec = current_executor().unwrap();
    assert!(exec.num_threads() >= 1);
    assert_eq!(sync_execute(&exec, || 2 + 2), Ok(4));

    veda_exec::shutdown();
    assert_eq!(current_executor().unwrap_err(), Error::NotInitialized);
}

#[test]
fn test_sync_execute_equals_direct_call() {
    let exec = ThreadPoolExecutor::with_threads(4).unwrap();
    let f = |x: u64| (x * 31) ^ 7;

    for x in 0..50u64 {
        assert_eq!(sync_execute(&exec, move || f(x)), Ok(f(x)));
    }
}

#[test]
fn test_squares_on_inline_executor() {
    let exec = InlineExecutor::new();
    assert_eq!(
        bulk_sync_execute(&exec, vec![0, 1, 2, 3, 4], |x| x * x),
        Ok(vec![0, 1, 4, 9, 16])
    );
}

#[test]
fn test_post_runs_exactly_once() {
    let exec = ThreadPoolExecutor::with_threads(2).unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let (done, finished) = promise::<()>();

    let h = hits.clone();
    let record = move |n: usize| {
        h.fetch_add(n, Ordering::SeqCst);
        done.set_value(());
    };
    post(&exec, move || record(5));

    finished.wait_and_get().unwrap();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(hits.load(Ordering::SeqCst), 5);
}

#[test]
fn test_continuation_ready_after_predecessor() {
    let exec = ThreadPoolExecutor::with_threads(2).unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));
    let (trigger, pred) = promise::<&'static str>();

    let o = order.clone();
    let next = then_execute(&exec, pred, move |p| {
        let v = p.wait_and_get();
        o.lock().push("continuation");
        v
    })
    .unwrap();

    assert!(!next.wait_timeout(Duration::from_millis(20)));
    order.lock().push("trigger");
    trigger.set_value("value");

    assert_eq!(next.wait_and_get(), Ok(Ok("value")));
    assert_eq!(*order.lock(), vec!["trigger", "continuation"]);
}

#[test]
fn test_second_continuation_rejected() {
    let exec = Recording::default();
    let (trigger, pred) = promise::<i32>();

    let first = then_execute(&exec, pred.clone(), |p| p.wait_and_get()).unwrap();
    assert!(pred.has_continuation());
    assert_eq!(
        then_execute(&exec, pred, |_| ()).unwrap_err(),
        Error::ContinuationAlreadyAttached
    );
    assert!(exec.log.lock().is_empty());

    trigger.set_value(9);
    assert_eq!(first.wait_and_get(), Ok(Ok(9)));
    assert_eq!(*exec.log.lock(), vec!["then_execute"]);
}

#[test]
fn test_bulk_handles_index_aligned() {
    let exec = ThreadPoolExecutor::with_threads(3).unwrap();
    let words = vec!["alpha", "be", "gam"];
    let handles = bulk_async_execute(&exec, words, |w: &str| w.len());

    assert_eq!(handles.len(), 3);
    let lens: Vec<_> = handles.into_iter().map(|h| h.wait_and_get()).collect();
    assert_eq!(lens, vec![Ok(5), Ok(2), Ok(3)]);
}

#[test]
fn test_bulk_failure_reports_lowest_index() {
    let exec = ThreadPoolExecutor::with_threads(4).unwrap();
    let ran = Arc::new(AtomicUsize::new(0));
    let r = ran.clone();

    let result = bulk_sync_execute(&exec, 0..20, move |i| {
        r.fetch_add(1, Ordering::SeqCst);
        if i % 6 == 5 {
            panic!("bad element {}", i);
        }
    });

    assert_eq!(result.unwrap_err(), Error::panicked("bad element 5"));
    assert_eq!(ran.load(Ordering::SeqCst), 20);
}

#[test]
fn test_bulk_then_submission_counts() {
    let exec = Recording::default();
    let (trigger, pred) = promise::<Vec<i32>>();

    let out = bulk_then_execute(&exec, 0..3usize, pred, |i, v: &Vec<i32>| v[i] * 2).unwrap();
    assert!(exec.log.lock().is_empty());

    trigger.set_value(vec![7, 8, 9]);
    let log = exec.log.lock().clone();
    assert_eq!(log.iter().filter(|d| **d == "bulk_then_execute").count(), 1);
    assert_eq!(log.iter().filter(|d| **d == "bulk_async_execute").count(), 3);
    assert_eq!(out.wait_and_get(), Ok(vec![14, 16, 18]));
}

#[test]
fn test_dropped_promise_breaks_handle() {
    let (p, handle) = promise::<String>();
    drop(p);
    assert_eq!(handle.wait_and_get(), Err(Error::BrokenPromise));
}

#[test]
fn test_logical_tasks_await_handles() {
    let exec = ThreadPoolExecutor::with_threads(1).unwrap();
    let inner = exec.clone();

    let handle = spawn_async(&exec, async move {
        let parts = bulk_async_execute(&inner, vec![1, 2, 3, 4], |x: i32| x * 10);
        when_all(parts).await.map(|v| v.into_iter().sum::<i32>())
    });

    assert_eq!(handle.wait_and_get(), Ok(Ok(100)));
}

#[test]
fn test_thread_per_task_stack_hint() {
    let exec = ThreadPerTaskExecutor::with_name("big").with_stack_size(StackSize::Huge);
    let depth = sync_execute(&exec, || {
        fn recurse(n: u32) -> u32 {
            let pad = [0u8; 512];
            if n == 0 {
                pad[0] as u32
            } else {
                recurse(n - 1) + std::hint::black_box(pad)[1] as u32 + 1
            }
        }
        recurse(2_000)
    });
    assert_eq!(depth, Ok(2_000));
}

#[test]
fn test_pool_metrics_count_work() {
    let exec = ThreadPoolExecutor::with_threads(2).unwrap();
    bulk_sync_execute(&exec, 0..32, |_| ()).unwrap();

    // the handle is completed from inside the task, before it is counted
    let mut snapshot = exec.metrics();
    for _ in 0..100 {
        if snapshot.tasks_executed >= 32 {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
        snapshot = exec.metrics();
    }
    assert!(snapshot.tasks_scheduled >= 32);
    assert!(snapshot.tasks_executed >= 32);
}
