//! Tuning constants shared across the ring and pool implementations.

/// Default ring buffer capacity used by [`crate::Pool::new`] when the caller
/// does not pick an explicit capacity via [`crate::Pool::with_capacity`].
pub const DEFAULT_RING_CAPACITY: usize = 4096;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_nonzero() {
        assert!(DEFAULT_RING_CAPACITY > 0);
    }
}
