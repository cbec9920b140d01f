//! Delay-and-cancel scheduling.
//!
//! A [`Debouncer`] holds at most one pending job. Scheduling a new job
//! replaces the pending one, so only the job scheduled last runs, and only
//! once the quiet period has passed without another schedule.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    slot: Mutex<Option<JoinHandle<()>>>,
    /// Bumped on every schedule/cancel. A woken job only runs if the
    /// generation it was scheduled under is still current.
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slot: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Runs `job` after the quiet period unless another call to `schedule` or
    /// [`cancel`](Self::cancel) comes first. Must be called from within a
    /// tokio runtime.
    pub fn schedule<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.slot.lock().unwrap();

        let scheduled_at = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.generation.clone();
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if generation.load(Ordering::SeqCst) != scheduled_at {
                return;
            }

            job();
        });

        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Drops the pending job, if any.
    pub fn cancel(&self) {
        let mut slot = self.slot.lock().unwrap();
        self.generation.fetch_add(1, Ordering::SeqCst);

        if let Some(previous) = slot.take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
