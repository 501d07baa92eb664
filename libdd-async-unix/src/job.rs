// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::thread;

#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// The OS refused to create the thread, typically `EAGAIN` under
    /// resource pressure.
    #[error("Failed to spawn detached thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Runs `job` on a new detached thread named `name`.
///
/// The `JoinHandle` is dropped immediately, so the thread releases its own
/// resources when `job` returns and nothing can wait for it. Returns as soon
/// as the thread exists; `job` may not have started yet, let alone finished.
/// A `job` that never returns pins a live thread for the rest of the
/// process's life, which is the caller's problem by contract.
pub fn spawn_detached<F>(name: &str, job: F) -> Result<(), SpawnError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(job)
        .map(drop)
        .map_err(SpawnError::from)
}

/// Thread-spawning capability.
///
/// The close dispatcher takes this as a seam so tests can count spawns or
/// force creation failures; production code uses [`ThreadSpawner`].
pub trait JobSpawner {
    fn spawn(&self, name: &str, job: Box<dyn FnOnce() + Send + 'static>)
        -> Result<(), SpawnError>;
}

/// Spawns plain detached OS threads via [`spawn_detached`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawner;

impl JobSpawner for ThreadSpawner {
    fn spawn(
        &self,
        name: &str,
        job: Box<dyn FnOnce() + Send + 'static>,
    ) -> Result<(), SpawnError> {
        spawn_detached(name, job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    #[test]
    fn test_spawn_detached_runs_job() {
        let (tx, rx) = mpsc::channel();
        spawn_detached("test-job", move || tx.send(42).unwrap()).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
    }

    #[test]
    fn test_spawn_detached_does_not_wait_for_job() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let done = Arc::new(AtomicBool::new(false));
        let thread_done = done.clone();
        spawn_detached("test-block", move || {
            release_rx.recv().unwrap();
            thread_done.store(true, Ordering::SeqCst);
        })
        .unwrap();
        // We got here while the job is still parked on the channel.
        assert!(!done.load(Ordering::SeqCst));
        release_tx.send(()).unwrap();
    }

    #[test]
    fn test_thread_spawner_spawns() {
        let (tx, rx) = mpsc::channel();
        ThreadSpawner
            .spawn("test-spawner", Box::new(move || tx.send(()).unwrap()))
            .unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
}
