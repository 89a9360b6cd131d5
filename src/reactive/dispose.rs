//! Scoped ownership of background tasks.

use parking_lot::Mutex;
use std::future::Future;
use tokio::task::JoinHandle;

/// Owns the tasks spawned for a screen and aborts them when dropped.
///
/// Releasing a screen releases its bag, which stops the owner loop and every
/// in-flight request task. Late responses are then discarded with the tasks.
#[derive(Debug, Default)]
pub struct DisposeBag {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DisposeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` on the current runtime and keep its handle.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut tasks = self.tasks.lock();
        tasks.retain(|handle| !handle.is_finished());
        tasks.push(handle);
    }

    /// Number of tasks still running.
    pub fn len(&self) -> usize {
        let mut tasks = self.tasks.lock();
        tasks.retain(|handle| !handle.is_finished());
        tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Abort every owned task.
    pub fn dispose(&self) {
        for handle in self.tasks.lock().drain(..) {
            handle.abort();
        }
    }
}

impl Drop for DisposeBag {
    fn drop(&mut self) {
        self.dispose();
    }
}
