//! The Promise/Handle pair used to return a submitted task's result.
//!
//! `Promise<R>` is the worker-side view: it is fulfilled exactly once,
//! either with the task's return value or with a captured panic.
//! `Handle<R>` is the submitter-side view: a blocking wait for whichever
//! of those two things happens, or an immediate "no result" signal for a
//! `Handle` created after the pool has stopped.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex};

/// A task's return value, or a record of the panic it raised instead.
#[derive(Debug)]
pub enum Outcome<R> {
    /// The task ran to completion and produced `R`.
    Value(R),
    /// The task panicked; its worker thread is unaffected.
    Failed(TaskPanic),
}

impl<R> Outcome<R> {
    /// Returns the value, panicking with the captured task panic message
    /// if the task itself failed. Convenience for tests and examples.
    pub fn unwrap(self) -> R {
        match self {
            Outcome::Value(v) => v,
            Outcome::Failed(panic) => panic!("task panicked: {panic}"),
        }
    }
}

/// A record of a panic caught from a submitted task.
#[derive(Debug, Clone)]
pub struct TaskPanic {
    message: String,
}

impl TaskPanic {
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "task panicked with a non-string payload".to_string()
        };
        Self { message }
    }
}

impl fmt::Display for TaskPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

enum State<R> {
    Pending,
    Done(Outcome<R>),
}

struct Shared<R> {
    state: Mutex<State<R>>,
    ready: Condvar,
}

/// The worker-side half of a pending result. Fulfilled exactly once.
pub(crate) struct Promise<R> {
    shared: Arc<Shared<R>>,
}

/// The submitter-side half of a pending result.
///
/// Obtained from [`crate::Pool::submit`]. Blocks on [`Handle::wait`] until
/// the task completes, or resolves immediately to `None` if it was created
/// for a submission refused after the pool stopped.
pub struct Handle<R> {
    shared: Option<Arc<Shared<R>>>,
}

/// Creates a connected `Promise`/`Handle` pair, both initially pending.
pub(crate) fn pair<R>() -> (Promise<R>, Handle<R>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State::Pending),
        ready: Condvar::new(),
    });
    (
        Promise {
            shared: shared.clone(),
        },
        Handle {
            shared: Some(shared),
        },
    )
}

impl<R> Promise<R> {
    /// Fulfils the promise with a successful value.
    pub(crate) fn fulfil(self, value: R) {
        self.resolve(Outcome::Value(value));
    }

    /// Fulfils the promise with a captured task panic.
    pub(crate) fn fail(self, panic: TaskPanic) {
        self.resolve(Outcome::Failed(panic));
    }

    fn resolve(self, outcome: Outcome<R>) {
        let mut state = self.shared.state.lock().unwrap();
        *state = State::Done(outcome);
        drop(state);
        self.shared.ready.notify_all();
    }
}

impl<R> Handle<R> {
    /// Creates an already-invalid handle: `wait` resolves to `None`
    /// immediately without blocking. Used for submissions refused after
    /// the pool has stopped.
    pub(crate) fn invalid() -> Self {
        Self { shared: None }
    }

    /// Blocks until the task completes, or returns `None` immediately if
    /// this handle was never attached to a submitted task.
    pub fn wait(self) -> Option<Outcome<R>> {
        let shared = self.shared?;
        let mut state = shared.state.lock().unwrap();
        loop {
            match &*state {
                State::Pending => {
                    state = shared.ready.wait(state).unwrap();
                }
                State::Done(_) => break,
            }
        }
        match std::mem::replace(&mut *state, State::Pending) {
            State::Done(outcome) => Some(outcome),
            State::Pending => unreachable!("checked above"),
        }
    }
}
