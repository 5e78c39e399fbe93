//! Background jobs polled from the UI thread.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Results of jobs running on worker threads.
///
/// Any number of jobs may be outstanding. Each finished job overwrites the slot, so
/// whichever response arrives last is the one [`InFlight::take`] hands out.
pub struct InFlight<T> {
    slot: Arc<Mutex<Option<T>>>,
    pending: Arc<AtomicUsize>,
}

impl<T> Default for InFlight<T> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<T: Send + 'static> InFlight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` on a new thread and wake the UI when it finishes.
    pub fn spawn<F>(&self, ctx: &egui::Context, job: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let ctx = ctx.clone();
        self.spawn_with(job, move || ctx.request_repaint());
    }

    pub fn spawn_with<F, N>(&self, job: F, notify: N)
    where
        F: FnOnce() -> T + Send + 'static,
        N: FnOnce() + Send + 'static,
    {
        let slot = Arc::clone(&self.slot);
        let pending = Arc::clone(&self.pending);
        pending.fetch_add(1, Ordering::SeqCst);
        std::thread::spawn(move || {
            let value = job();
            *slot.lock() = Some(value);
            pending.fetch_sub(1, Ordering::SeqCst);
            notify();
        });
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_pending(&self) -> bool {
        self.pending() > 0
    }

    /// The latest finished result, if one arrived since the last call.
    pub fn take(&self) -> Option<T> {
        self.slot.lock().take()
    }
}

impl<T> std::fmt::Debug for InFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight")
            .field("pending", &self.pending.load(Ordering::SeqCst))
            .field("ready", &self.slot.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn result_is_taken_once() {
        let jobs = InFlight::new();
        let (done, wait) = mpsc::channel();
        jobs.spawn_with(|| 7, move || done.send(()).unwrap());
        wait.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(!jobs.is_pending());
        assert_eq!(jobs.take(), Some(7));
        assert_eq!(jobs.take(), None);
    }

    #[test]
    fn last_arrival_wins() {
        let jobs = InFlight::new();
        let (release_first, first_gate) = mpsc::channel::<()>();
        let (done, wait) = mpsc::channel();

        let first_done = done.clone();
        jobs.spawn_with(
            move || {
                first_gate.recv().unwrap();
                "first"
            },
            move || first_done.send(()).unwrap(),
        );
        jobs.spawn_with(|| "second", move || done.send(()).unwrap());
        assert!(jobs.pending() >= 1);

        wait.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(jobs.take(), Some("second"));

        release_first.send(()).unwrap();
        wait.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(jobs.take(), Some("first"));
        assert_eq!(jobs.pending(), 0);
    }
}
