/// A bounded work queue drained by one dedicated background thread.
///
/// Anything that may block (sound sequences with pauses, record loading and
/// saving, the intro countdown) is pushed through here so
/// the tick thread never waits on it.  Completion comes back through a
/// channel returned by [`Spawner::submit`].

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use crate::error::{GameError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable handle for queueing work on an [`Executor`].
#[derive(Clone)]
pub struct Spawner {
    tx: SyncSender<Job>,
}

impl Spawner {
    /// Queues `job`, blocking while the queue is full.  The returned receiver
    /// yields the job's result once it has run.
    pub fn submit<T, F>(&self, job: F) -> Result<Receiver<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (done_tx, done_rx) = mpsc::channel();
        let job: Job = Box::new(move || {
            // Receiver may have been dropped by a fire-and-forget caller
            let _ = done_tx.send(job());
        });
        self.tx.send(job).map_err(|_| GameError::WorkerGone)?;
        Ok(done_rx)
    }

    /// Queues `job` without blocking.  Returns `Ok(false)` when the queue is
    /// full and the job was dropped.
    pub fn try_submit<F>(&self, job: F) -> Result<bool>
    where
        F: FnOnce() + Send + 'static,
    {
        match self.tx.try_send(Box::new(job)) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => Err(GameError::WorkerGone),
        }
    }

    /// Runs `job` on the worker and waits for its result.
    pub fn run_blocking<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.submit(job)?.recv().map_err(|_| GameError::WorkerGone)
    }
}

/// Owns the worker thread.  Dropping the executor drains the queue and joins
/// the worker once every [`Spawner`] clone is gone too.
pub struct Executor {
    spawner: Spawner,
    worker: Option<JoinHandle<()>>,
}

impl Executor {
    pub fn spawn(name: &str, capacity: usize) -> Result<Self> {
        let (tx, rx) = mpsc::sync_channel::<Job>(capacity.max(1));
        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    job();
                }
            })?;
        Ok(Executor {
            spawner: Spawner { tx },
            worker: Some(worker),
        })
    }

    pub fn spawner(&self) -> Spawner {
        self.spawner.clone()
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        // Swap in a dead sender so the worker sees the queue close
        let (closed, _) = mpsc::sync_channel::<Job>(0);
        drop(std::mem::replace(&mut self.spawner.tx, closed));
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("executor worker panicked");
            }
        }
    }
}
