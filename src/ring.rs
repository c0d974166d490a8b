//! Bounded MPMC lock-free ring buffer.
//!
//! This is a single-writer-per-slot, single-reader-per-slot circular buffer
//! shared by an arbitrary number of producer and consumer threads. Three
//! atomic cursors coordinate access without ever taking a lock:
//!
//! - `tail` — the next slot a producer may reserve.
//! - `tail_commit` — the commit frontier: every slot strictly before this
//!   index has finished construction and is safe for a consumer to read.
//! - `head` — the next slot a consumer may take.
//!
//! A producer wins a slot by CASing `tail` forward, writes its value, then
//! waits for `tail_commit` to catch up to the slot it just reserved before
//! CASing `tail_commit` forward itself. This makes the order in which
//! values become visible to consumers equal to the order producers
//! reserved their slots, even though construction of two different slots
//! may finish out of order.
//!
//! A consumer never reads a slot still between `tail_commit` and `tail`
//! (reserved but not yet constructed), and never mutates a slot until it
//! has won the `head` CAS for it.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::error::{Result, RingPoolError};

/// A bounded multi-producer multi-consumer lock-free ring buffer.
///
/// Holds at most `capacity` live values of type `T` at once. Every
/// operation is non-blocking: `try_emplace` and `try_pop` either make
/// progress or report that the ring is full/empty and return immediately.
pub struct Ring<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    /// Number of usable slots (`slots.len()` is `capacity + 1`).
    capacity: usize,
    /// `slots.len()`, kept around so the modulo arithmetic below doesn't
    /// have to re-derive it from `capacity` on every call.
    slot_count: usize,
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
    tail_commit: CachePadded<AtomicUsize>,
}

// Safety: access to any given slot is arbitrated entirely by the `head` /
// `tail` / `tail_commit` CAS protocol below; no two threads ever observe
// the same slot as both readable and writable at once.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    /// Creates a new ring buffer with room for `capacity` live values.
    ///
    /// Rejects `capacity == 0`.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RingPoolError::config("ring capacity must be greater than 0"));
        }

        let slot_count = capacity + 1;
        let slots = (0..slot_count)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            slots,
            capacity,
            slot_count,
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            tail_commit: CachePadded::new(AtomicUsize::new(0)),
        })
    }

    /// Number of usable slots (`N` in the design docs).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Advisory: true iff `head == tail` under acquire loads.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Advisory snapshot of the number of committed, not-yet-popped items.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail_commit = self.tail_commit.load(Ordering::Acquire);
        (tail_commit + self.slot_count - head) % self.slot_count
    }

    #[inline]
    fn next(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.slot_count { 0 } else { next }
    }

    /// Attempts to reserve and construct one slot from `value`.
    ///
    /// Returns `Err(value)` handing the value back iff the ring is full,
    /// so a busy-retrying caller (see [`crate::Pool::submit`]) can try
    /// again with the same value instead of having to reconstruct it.
    /// Never blocks.
    pub fn try_emplace(&self, value: T) -> std::result::Result<(), T> {
        // 1. Reserve a slot by winning the `tail` CAS.
        let reserved = loop {
            let t = self.tail.load(Ordering::Relaxed);
            let next_t = self.next(t);
            let h = self.head.load(Ordering::Acquire);
            if next_t == h {
                return Err(value);
            }
            if self
                .tail
                .compare_exchange_weak(t, next_t, Ordering::Release, Ordering::Relaxed)
                .is_ok()
            {
                break t;
            }
        };

        // 2. Construct the value. Not visible to consumers until step 3.
        unsafe {
            (*self.slots[reserved].get()).write(value);
        }

        // 3. Publish: wait for our predecessor's commit, then advance
        // `tail_commit` past our own slot. Because every producer waits
        // for `tail_commit` to reach the slot it reserved, commits become
        // visible in the same order slots were reserved.
        loop {
            if self
                .tail_commit
                .compare_exchange(
                    reserved,
                    self.next(reserved),
                    Ordering::Release,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                break;
            }
        }

        Ok(())
    }

    /// Attempts to move one value out of the ring.
    ///
    /// Returns `None` iff the ring is empty, or the oldest reserved slot
    /// has been claimed by a producer but not yet committed. Never blocks.
    pub fn try_pop(&self) -> Option<T> {
        loop {
            let h = self.head.load(Ordering::Relaxed);
            let t = self.tail.load(Ordering::Acquire);
            if h == t {
                return None; // empty
            }
            let tail_commit = self.tail_commit.load(Ordering::Acquire);
            if h == tail_commit {
                return None; // reserved but not yet constructed
            }

            // Tentative, non-destructive peek: a bitwise read of the slot.
            // `MaybeUninit<T>` never runs `T`'s destructor on its own, so
            // if the CAS below loses, dropping this local copy is a no-op
            // and the slot's real (only) owner is untouched.
            let temp = unsafe { ptr::read(self.slots[h].get()) };

            if self
                .head
                .compare_exchange_weak(h, self.next(h), Ordering::Release, Ordering::Relaxed)
                .is_ok()
            {
                return Some(unsafe { temp.assume_init() });
            }
            // Lost the race: `temp`'s `MaybeUninit` wrapper drops here
            // without touching the value still owned by the slot.
        }
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        let mut i = *self.head.get_mut();
        let tail_commit = *self.tail_commit.get_mut();
        while i != tail_commit {
            unsafe {
                ptr::drop_in_place((*self.slots[i].get()).as_mut_ptr());
            }
            i = self.next(i);
        }
    }
}
