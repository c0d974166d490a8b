//! ringpool - a bounded lock-free MPMC ring buffer and the thread pool
//! built on top of it.
//!
//! The [`Ring`] is the hard part: an arbitrary number of producer and
//! consumer threads share a fixed array of slots with no locks, using
//! three atomic cursors (`head`, `tail`, `tail_commit`) to keep
//! construction, publication, and consumption strictly ordered under
//! relaxed/acquire/release memory ordering. [`Pool`] is a thin dispatcher
//! on top: a fixed set of worker threads pop type-erased callables out of
//! a `Ring` and run them, handing the submitter back a [`Handle`] to the
//! eventual result.
//!
//! ```
//! use ringpool::Pool;
//!
//! let pool = Pool::new(4).unwrap();
//! pool.start();
//!
//! let handles: Vec<_> = (0..8).map(|i| pool.submit(move || i * (i + 1))).collect();
//! let results: Vec<i32> = handles.into_iter().map(|h| h.wait().unwrap().unwrap()).collect();
//! assert_eq!(results, vec![0, 2, 6, 12, 20, 30, 42, 56]);
//!
//! pool.stop();
//! ```

pub mod constants;
pub mod error;
mod pool;
mod ring;

pub use error::{Result, RingPoolError};
pub use pool::{Handle, Outcome, Pool, TaskPanic};
pub use ring::Ring;

/// Version information, re-exported for callers that want to log it.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
