//! Lock-guarded merge of partial states into the pass-global state

use super::accumulator::AccumulatorState;
use crate::image::PixelValue;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Owner of the global accumulator for one pass
///
/// The global state is only ever written inside [`Merger::merge`], one
/// short critical section per region.
#[derive(Debug)]
pub struct Merger<T> {
    global: Mutex<AccumulatorState<T>>,
}

impl<T: PixelValue> Merger<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: Mutex::new(AccumulatorState::identity()),
        }
    }

    // A worker that panicked mid-merge leaves the state as it was before or
    // after its `combine`, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, AccumulatorState<T>> {
        self.global.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the global state to the identity
    pub fn reset(&mut self) {
        *self
            .global
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = AccumulatorState::identity();
    }

    /// Fold one partial state into the global state
    pub fn merge(&self, partial: &AccumulatorState<T>) {
        let mut global = self.lock();
        global.combine(partial);
        debug!(
            partial_count = partial.count,
            global_count = global.count,
            "merged region partial"
        );
    }

    /// Copy of the current global state
    #[must_use]
    pub fn snapshot(&self) -> AccumulatorState<T> {
        *self.lock()
    }
}

impl<T: PixelValue> Default for Merger<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_merges_are_not_lost() {
        let merger = Merger::<u32>::new();
        thread::scope(|scope| {
            for worker in 0..8u32 {
                let merger = &merger;
                scope.spawn(move || {
                    for i in 0..100u32 {
                        let mut partial = AccumulatorState::identity();
                        partial.push(worker * 100 + i);
                        merger.merge(&partial);
                    }
                });
            }
        });

        let global = merger.snapshot();
        assert_eq!(global.count, 800);
        assert_eq!(global.min, 0);
        assert_eq!(global.max, 799);
        assert_eq!(global.sum.value(), (0..800).sum::<u32>() as f64);
    }

    #[test]
    fn test_reset_restores_identity() {
        let mut merger = Merger::<i8>::new();
        let mut partial = AccumulatorState::identity();
        partial.push(-4);
        merger.merge(&partial);
        assert_eq!(merger.snapshot().count, 1);

        merger.reset();
        assert_eq!(merger.snapshot(), AccumulatorState::identity());
    }

    #[test]
    fn test_poisoned_lock_still_merges() {
        let merger = Merger::<f64>::new();
        let result = thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = merger.global.lock().unwrap();
                    panic!("worker failed while holding the lock");
                })
                .join()
        });
        assert!(result.is_err());

        let mut partial = AccumulatorState::identity();
        partial.push(2.5);
        merger.merge(&partial);
        assert_eq!(merger.snapshot().count, 1);
    }
}
