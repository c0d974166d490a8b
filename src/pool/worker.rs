//! Worker-thread consume loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_utils::Backoff;

use crate::ring::Ring;

/// A type-erased, nullary unit of work. The pool wraps every submitted
/// callable (together with the machinery to fulfil its `Promise`) into
/// one of these before handing it to the ring.
pub(crate) type UnitOfWork = Box<dyn FnOnce() + Send>;

/// Runs the consumer loop for a single worker thread: busy-pop from
/// `ring`, invoke whatever comes out, repeat until `stop` is observed.
///
/// A task that panics is caught here so one bad task cannot take the
/// worker thread down; the `UnitOfWork` itself is responsible for
/// routing that panic into the task's `Promise` (see `Pool::submit`).
pub(crate) fn run(id: usize, ring: Arc<Ring<UnitOfWork>>, stop: Arc<AtomicBool>) {
    tracing::info!(worker = id, "worker started");
    let backoff = Backoff::new();
    while !stop.load(Ordering::Acquire) {
        match ring.try_pop() {
            Some(task) => {
                backoff.reset();
                task();
            }
            None => {
                backoff.snooze();
            }
        }
    }
    tracing::info!(worker = id, "worker exiting");
}
