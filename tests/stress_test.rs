//! Stress tests for the execution layer

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use veda_exec::prelude::*;

#[test]
#[ignore] // Run with --ignored flag
fn stress_test_many_small_tasks() {
    let exec = ThreadPoolExecutor::with_threads(4).unwrap();

    for _ in 0..100 {
        let out = bulk_sync_execute(&exec, 0..1000, |x| x).unwrap();
        assert_eq!(out.iter().sum::<i32>(), 499_500);
    }
}

#[test]
#[ignore]
fn stress_test_nested_bulk() {
    let exec = ThreadPoolExecutor::with_threads(4).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    let inner = exec.clone();
    let c = counter.clone();
    bulk_sync_execute(&exec, 0..100, move |_| {
        let c = c.clone();
        bulk_sync_execute(&inner, 0..100, move |_| {
            c.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
    })
    .unwrap();

    assert_eq!(counter.load(Ordering::Relaxed), 10_000);
}

#[test]
#[ignore]
fn stress_test_long_continuation_chain() {
    let exec = ThreadPoolExecutor::with_threads(2).unwrap();
    let (trigger, first) = promise::<u64>();

    let mut last = first;
    for _ in 0..10_000 {
        last = then_execute(&exec, last, |p| p.wait_and_get().unwrap_or(0) + 1).unwrap();
    }

    trigger.set_value(0);
    assert_eq!(last.wait_and_get(), Ok(10_000));
}

#[test]
#[ignore]
fn stress_test_repeated_pool_lifecycle() {
    for i in 0..10 {
        let exec = ThreadPoolExecutor::with_threads(4).unwrap();
        let out = bulk_sync_execute(&exec, 0..100, |x| x).unwrap();
        assert_eq!(out.iter().sum::<i32>(), 4950, "Iteration {}", i);
    }
}

#[test]
#[ignore]
fn stress_test_high_contention() {
    let exec = ThreadPoolExecutor::with_threads(8).unwrap();
    let data = Arc::new(Mutex::new(vec![0i32; 100]));

    let d = data.clone();
    bulk_sync_execute(&exec, 0..10_000usize, move |i| {
        d.lock()[i % 100] += 1;
    })
    .unwrap();

    assert!(data.lock().iter().all(|&v| v == 100));
}

#[test]
#[ignore]
fn stress_test_many_logical_tasks() {
    let exec = ThreadPoolExecutor::with_threads(2).unwrap();

    let handles: Vec<_> = (0..1000u64)
        .map(|i| {
            let inner = exec.clone();
            spawn_async(&exec, async move {
                let a = async_execute(&inner, move || i).await.unwrap_or(0);
                let b = async_execute(&inner, move || i * 2).await.unwrap_or(0);
                a + b
            })
        })
        .collect();

    let total: u64 = wait_all(handles).unwrap().into_iter().sum();
    assert_eq!(total, 3 * 999 * 1000 / 2);
}
