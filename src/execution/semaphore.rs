use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A small, blocking counting semaphore bounding how many chunks run at once.
pub(crate) struct Semaphore {
    permits: Mutex<usize>,
    cv: Condvar,
}

/// A held permit; released when dropped.
pub(crate) struct Permit<'a> {
    sem: &'a Semaphore,
    waited: Duration,
}

impl Semaphore {
    pub(crate) fn new(permits: usize) -> Self {
        debug_assert!(permits > 0, "permits must be > 0");
        Self {
            permits: Mutex::new(permits),
            cv: Condvar::new(),
        }
    }

    /// Acquire one permit, blocking until one is available.
    pub(crate) fn acquire(&self) -> Permit<'_> {
        let start = Instant::now();
        let mut waited = false;
        let mut available = self.lock();
        while *available == 0 {
            waited = true;
            available = self
                .cv
                .wait(available)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *available -= 1;
        Permit {
            sem: self,
            waited: if waited { start.elapsed() } else { Duration::ZERO },
        }
    }

    fn release(&self) {
        *self.lock() += 1;
        self.cv.notify_one();
    }

    // Counter updates cannot leave it inconsistent, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.permits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Permit<'_> {
    /// Time spent blocked in [`Semaphore::acquire`] (zero if a permit was free).
    pub(crate) fn waited(&self) -> Duration {
        self.waited
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.sem.release();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Semaphore;

    #[test]
    fn dropping_a_permit_frees_it() {
        let sem = Semaphore::new(1);
        let first = sem.acquire();
        assert_eq!(first.waited(), Duration::ZERO);
        drop(first);
        let second = sem.acquire();
        assert_eq!(second.waited(), Duration::ZERO);
    }

    #[test]
    fn acquire_blocks_until_release() {
        let sem = Semaphore::new(1);
        let held = sem.acquire();
        std::thread::scope(|s| {
            let waiter = s.spawn(|| sem.acquire().waited());
            std::thread::sleep(Duration::from_millis(20));
            drop(held);
            assert!(waiter.join().unwrap() > Duration::ZERO);
        });
    }
}
