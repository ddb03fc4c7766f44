//! Binary cross-thread signal between the sampler and its consumer.
//!
//! The pending flag lives under the same mutex the condition variable waits
//! on, so a `signal()` that lands before `wait()` is never lost and any
//! number of signals before a wait collapse into one wakeup.

use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct Notifier {
    pending: Mutex<bool>,
    cond: Condvar,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a bool half-written.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks the notifier pending and wakes every waiting thread.
    pub fn signal(&self) {
        let mut pending = self.lock();
        *pending = true;
        self.cond.notify_all();
    }

    /// Blocks until pending, then clears it and returns.
    ///
    /// Returns immediately when a signal arrived before the call.
    pub fn wait(&self) {
        let mut pending = self.lock();
        while !*pending {
            pending = self.cond.wait(pending).unwrap_or_else(|e| e.into_inner());
        }
        *pending = false;
    }

    /// Reports whether a signal is pending, without consuming it.
    pub fn check(&self) -> bool {
        *self.lock()
    }

    pub fn footprint(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_signal_before_wait_returns_immediately() {
        let notifier = Notifier::new();
        notifier.signal();
        notifier.wait();
        assert!(!notifier.check());
    }

    #[test]
    fn test_check_does_not_consume() {
        let notifier = Notifier::new();
        assert!(!notifier.check());
        notifier.signal();
        assert!(notifier.check());
        assert!(notifier.check());
        notifier.wait();
        assert!(!notifier.check());
    }

    #[test]
    fn test_many_signals_collapse_into_one_wakeup() {
        let notifier = Arc::new(Notifier::new());
        for _ in 0..10 {
            notifier.signal();
        }

        let wakeups = Arc::new(AtomicUsize::new(0));
        let waiter = {
            let notifier = Arc::clone(&notifier);
            let wakeups = Arc::clone(&wakeups);
            thread::spawn(move || {
                notifier.wait();
                wakeups.fetch_add(1, Ordering::SeqCst);
                notifier.wait();
                wakeups.fetch_add(1, Ordering::SeqCst);
            })
        };

        // first wait consumed the collapsed signal, the second one is parked
        thread::sleep(Duration::from_millis(50));
        assert_eq!(wakeups.load(Ordering::SeqCst), 1);

        notifier.signal();
        waiter.join().unwrap();
        assert_eq!(wakeups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_wakes_parked_waiter() {
        let notifier = Arc::new(Notifier::new());
        let waiter = {
            let notifier = Arc::clone(&notifier);
            thread::spawn(move || notifier.wait())
        };

        thread::sleep(Duration::from_millis(20));
        notifier.signal();
        waiter.join().unwrap();
        assert!(!notifier.check());
    }

    #[test]
    fn test_ping_pong_never_loses_a_signal() {
        let notifier = Arc::new(Notifier::new());
        let rounds = 1000;

        let consumer = {
            let notifier = Arc::clone(&notifier);
            thread::spawn(move || {
                for _ in 0..rounds {
                    notifier.wait();
                }
            })
        };

        let producer = {
            let notifier = Arc::clone(&notifier);
            thread::spawn(move || {
                for _ in 0..rounds {
                    // wait until the previous signal was consumed
                    while notifier.check() {
                        thread::yield_now();
                    }
                    notifier.signal();
                }
            })
        };

        producer.join().unwrap();
        consumer.join().unwrap();
        assert!(!notifier.check());
    }
}
