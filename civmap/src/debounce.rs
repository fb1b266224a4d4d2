//! Cancel-and-reschedule timer shared by the suggestion and fade channels.

use parking_lot::Mutex;
use std::{future::Future, time::Duration};
use tokio::task::JoinHandle;

/// Runs only the most recently scheduled action, after a fixed delay.
///
/// Scheduling aborts whatever was pending before, including an action that
/// already woke up and is suspended on its own awaits. Dropping the
/// debouncer cancels the pending action.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending action with `action`, to run after [`Self::delay`].
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });

        if let Some(previous) = self.pending.lock().replace(task) {
            previous.abort();
        }
    }

    /// Cancel the pending action. Returns whether one was still pending.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(task) => {
                let was_pending = !task.is_finished();
                task.abort();
                was_pending
            },
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(task) = self.pending.get_mut().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    const DELAY: Duration = Duration::from_millis(300);

    fn counter_action(counter: &Arc<AtomicUsize>, value: usize) -> impl Future<Output = ()> {
        let counter = counter.clone();
        async move {
            counter.store(value, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(DELAY);

        debouncer.schedule(counter_action(&fired, 1));
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_cancels_previous() {
        let fired = Arc::new(AtomicUsize::new(0));
        let runs = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(DELAY);

        for value in 1..=5 {
            let runs = runs.clone();
            let action = counter_action(&fired, value);
            debouncer.schedule(async move {
                runs.fetch_add(1, Ordering::SeqCst);
                action.await;
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        tokio::time::sleep(DELAY).await;
        assert_eq!(fired.load(Ordering::SeqCst), 5);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_run() {
        let fired = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(DELAY);

        debouncer.schedule(counter_action(&fired, 1));
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending() {
        let fired = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(DELAY);

        debouncer.schedule(counter_action(&fired, 1));
        drop(debouncer);

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
