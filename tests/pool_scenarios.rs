//! End-to-end scenarios for `Pool`: arithmetic dispatch, submission after
//! stop, restart, and panic isolation between tasks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ringpool::{Outcome, Pool};

/// Every test in this file exercises a `Pool`, which logs lifecycle events
/// via `tracing`; install a subscriber so those events actually go
/// somewhere when running `cargo test -- --nocapture`. Fails silently if a
/// subscriber is already installed (tests in this binary run concurrently).
fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

#[test]
fn submitted_arithmetic_runs_on_worker_threads() {
    init_tracing();
    let pool = Pool::new(4).unwrap();
    pool.start();

    let handles: Vec<_> = (0..16i64).map(|i| pool.submit(move || i * i)).collect();
    let mut results: Vec<i64> = handles.into_iter().map(|h| h.wait().unwrap().unwrap()).collect();
    results.sort_unstable();

    let expected: Vec<i64> = (0..16i64).map(|i| i * i).collect();
    assert_eq!(results, expected);

    pool.stop();
}

#[test]
fn submission_after_stop_resolves_to_none_without_running() {
    init_tracing();
    let pool = Pool::new(2).unwrap();
    pool.start();
    pool.stop();

    let ran = Arc::new(AtomicUsize::new(0));
    let ran_clone = ran.clone();
    let handle = pool.submit(move || {
        ran_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert!(handle.wait().is_none());
    // Give a would-be worker a moment to misbehave; there are none running.
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn pool_restarts_after_stop_and_serves_new_submissions() {
    init_tracing();
    let pool = Pool::new(2).unwrap();

    pool.start();
    let a = pool.submit(|| "a");
    assert_eq!(a.wait().unwrap().unwrap(), "a");
    pool.stop();

    // Submitting while stopped is a no-op handle, not a crash.
    let rejected = pool.submit(|| "rejected");
    assert!(rejected.wait().is_none());

    pool.start();
    let b = pool.submit(|| "b");
    assert_eq!(b.wait().unwrap().unwrap(), "b");
    pool.stop();
}

#[test]
fn a_panicking_task_does_not_take_down_its_worker() {
    init_tracing();
    let pool = Pool::new(1).unwrap();
    pool.start();

    let panicked = pool.submit(|| -> i32 { panic!("boom") });
    match panicked.wait() {
        Some(Outcome::Failed(panic)) => assert_eq!(panic.to_string(), "boom"),
        other => panic!("expected Failed(..), got {other:?}"),
    }

    // The same (sole) worker must still be alive to pick up the next task.
    let survivor = pool.submit(|| 42);
    assert_eq!(survivor.wait().unwrap().unwrap(), 42);

    pool.stop();
}

#[test]
fn many_producers_share_one_pool_concurrently() {
    init_tracing();
    let pool = Arc::new(Pool::new(4).unwrap());
    pool.start();

    let producers: Vec<_> = (0..8usize)
        .map(|p| {
            let pool = pool.clone();
            std::thread::spawn(move || {
                let handles: Vec<_> = (0..20u64)
                    .map(|i| pool.submit(move || p as u64 * 1000 + i))
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.wait().unwrap().unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all: Vec<u64> = producers.into_iter().flat_map(|t| t.join().unwrap()).collect();
    all.sort_unstable();

    let mut expected: Vec<u64> = (0..8u64).flat_map(|p| (0..20u64).map(move |i| p * 1000 + i)).collect();
    expected.sort_unstable();

    assert_eq!(all, expected);
    pool.stop();
}
