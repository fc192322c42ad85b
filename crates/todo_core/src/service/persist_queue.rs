//! Ordered fire-and-forget persistence worker.
//!
//! # Responsibility
//! - Own the key-value adapter on a dedicated thread.
//! - Apply blob writes in the order they were enqueued.
//! - Serve the one-time startup read on the same thread.
//!
//! # Invariants
//! - Writes are FIFO; a later snapshot always lands after an earlier one.
//! - Write failures are logged and dropped; they never reach the caller.
//! - Dropping the queue drains every pending write before the thread exits.

use crate::repo::kv_repo::{KeyValueStore, RepoError, RepoResult};
use log::{debug, error, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

const WORKER_THREAD_NAME: &str = "todo-persist";

enum PersistCommand {
    Load {
        reply: Sender<RepoResult<Option<String>>>,
    },
    Save {
        blob: String,
    },
    Flush {
        reply: Sender<()>,
    },
}

/// Handle to the persistence worker thread for one storage key.
pub struct PersistQueue {
    sender: Option<Sender<PersistCommand>>,
    worker: Option<JoinHandle<()>>,
}

impl PersistQueue {
    /// Moves `store` onto a new worker thread bound to `key`.
    ///
    /// # Errors
    /// - `Unavailable` when the OS refuses to spawn the thread.
    pub fn spawn<S>(store: S, key: impl Into<String>) -> RepoResult<Self>
    where
        S: KeyValueStore + Send + 'static,
    {
        let key = key.into();
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(store, key, receiver))
            .map_err(|err| RepoError::Unavailable(format!("failed to spawn worker: {err}")))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Reads the current blob, blocking until the worker answers.
    pub fn load(&self) -> RepoResult<Option<String>> {
        let (reply, response) = mpsc::channel();
        self.send(PersistCommand::Load { reply })?;
        response
            .recv()
            .map_err(|_| RepoError::Unavailable("persistence worker stopped".to_string()))?
    }

    /// Enqueues a full snapshot write and returns immediately.
    pub fn save(&self, blob: String) {
        if let Err(err) = self.send(PersistCommand::Save { blob }) {
            error!(
                "event=todo_persist module=persist status=error error_code=enqueue_failed error={}",
                err
            );
        }
    }

    /// Blocks until every write enqueued before this call has been attempted.
    pub fn flush(&self) {
        let (reply, done) = mpsc::channel();
        if self.send(PersistCommand::Flush { reply }).is_ok() {
            let _ = done.recv();
        }
    }

    fn send(&self, command: PersistCommand) -> RepoResult<()> {
        self.sender
            .as_ref()
            .ok_or_else(|| RepoError::Unavailable("persistence queue closed".to_string()))?
            .send(command)
            .map_err(|_| RepoError::Unavailable("persistence worker stopped".to_string()))
    }
}

impl Drop for PersistQueue {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once the backlog is drained.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=todo_persist module=persist status=error error_code=worker_panicked");
            }
        }
    }
}

fn run_worker<S: KeyValueStore>(store: S, key: String, receiver: Receiver<PersistCommand>) {
    debug!("event=persist_worker module=persist status=start");
    for command in receiver {
        match command {
            PersistCommand::Load { reply } => {
                let _ = reply.send(store.get(&key));
            }
            PersistCommand::Save { blob } => write_snapshot(&store, &key, &blob),
            PersistCommand::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }
    debug!("event=persist_worker module=persist status=stop");
}

fn write_snapshot<S: KeyValueStore>(store: &S, key: &str, blob: &str) {
    let started_at = Instant::now();
    match store.set(key, blob) {
        Ok(()) => debug!(
            "event=todo_persist module=persist status=ok bytes={} duration_ms={}",
            blob.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event=todo_persist module=persist status=error error_code=write_failed duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
