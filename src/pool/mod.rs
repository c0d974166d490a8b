//! Thread-pool dispatcher built on [`crate::Ring`].
//!
//! [`Pool`] owns a fixed set of worker threads and a shared
//! [`Ring`](crate::Ring) of type-erased callables. Submitting a task
//! wraps it in a [`Promise`]/[`Handle`] pair, busy-inserts the wrapped
//! callable into the ring, and returns the `Handle` to the caller.

mod handle;
mod worker;

pub use handle::{Handle, Outcome, TaskPanic};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_utils::Backoff;

use crate::constants::DEFAULT_RING_CAPACITY;
use crate::error::{Result, RingPoolError};
use crate::ring::Ring;
use worker::UnitOfWork;

/// A fixed-size pool of worker threads that execute submitted callables
/// pulled from a lock-free [`Ring`].
///
/// `Pool` is neither `Clone` nor movable in the sense that matters: its
/// identity is pinned to the worker threads it spawns. `start`/`submit`/
/// `stop` all take `&self` (worker handles live behind a `Mutex`) so a
/// single `Pool`, or an `Arc<Pool>`, can be shared by any number of
/// submitter threads and stopped from any one of them.
pub struct Pool {
    ring: Arc<Ring<UnitOfWork>>,
    stop: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl Pool {
    /// Creates a pool with `worker_count` workers and the default ring
    /// capacity. Does not spawn any threads until [`Pool::start`] is
    /// called.
    pub fn new(worker_count: usize) -> Result<Self> {
        Self::with_capacity(worker_count, DEFAULT_RING_CAPACITY)
    }

    /// Creates a pool with `worker_count` workers and a ring sized for
    /// `capacity` in-flight tasks.
    pub fn with_capacity(worker_count: usize, capacity: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(RingPoolError::config("worker_count must be greater than 0"));
        }

        Ok(Self {
            ring: Arc::new(Ring::new(capacity)?),
            stop: Arc::new(AtomicBool::new(true)),
            workers: Mutex::new(Vec::new()),
            worker_count,
        })
    }

    /// Number of worker threads this pool is configured to run.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Starts the pool's workers.
    ///
    /// Idempotent: calling `start` while already running has no effect.
    /// Legal after a prior `stop`, in which case a fresh set of worker
    /// threads is spawned.
    pub fn start(&self) {
        let was_stopped = self.stop.swap(false, Ordering::AcqRel);
        if !was_stopped {
            return;
        }

        let spawned = (0..self.worker_count)
            .map(|id| {
                let ring = self.ring.clone();
                let stop = self.stop.clone();
                std::thread::spawn(move || worker::run(id, ring, stop))
            })
            .collect();
        *self.workers.lock().unwrap() = spawned;

        tracing::info!(workers = self.worker_count, "pool started");
    }

    /// Submits `f` for execution and returns a [`Handle`] to its result.
    ///
    /// If the pool is stopped (never started, or already stopped), `f` is
    /// dropped without running and the returned `Handle` resolves to
    /// `None` immediately. Otherwise this busy-retries insertion into the
    /// ring until it succeeds; a panic inside `f` is caught and delivered
    /// through the `Handle` as [`Outcome::Failed`] rather than taking the
    /// worker thread down.
    pub fn submit<F, R>(&self, f: F) -> Handle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.stop.load(Ordering::Acquire) {
            return Handle::invalid();
        }

        let (promise, handle) = handle::pair::<R>();
        let unit: UnitOfWork = Box::new(move || {
            match catch_unwind(AssertUnwindSafe(f)) {
                Ok(value) => promise.fulfil(value),
                Err(payload) => {
                    let panic = TaskPanic::from_payload(payload);
                    tracing::debug!(%panic, "submitted task panicked");
                    promise.fail(panic);
                }
            }
        });

        let backoff = Backoff::new();
        let mut pending = unit;
        while let Err(rejected) = self.ring.try_emplace(pending) {
            backoff.snooze();
            pending = rejected;
        }

        handle
    }

    /// Stops the pool.
    ///
    /// Idempotent. Joins every worker thread; tasks still sitting in the
    /// ring at the moment of the flip may never be dispatched. After this
    /// returns, [`Pool::submit`] refuses new work until [`Pool::start`]
    /// is called again.
    pub fn stop(&self) {
        let was_running = !self.stop.swap(true, Ordering::AcqRel);
        let mut workers = self.workers.lock().unwrap();
        if !was_running && workers.is_empty() {
            return;
        }

        let joined = workers.len();
        for worker in workers.drain(..) {
            let _ = worker.join();
        }
        tracing::info!(workers = joined, "pool stopped");
    }
}

impl Default for Pool {
    /// Creates a pool sized to the host's available parallelism
    /// (`num_cpus::get()`) with the default ring capacity.
    fn default() -> Self {
        Self::new(num_cpus::get()).expect("num_cpus::get() is always >= 1")
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.stop();
    }
}
