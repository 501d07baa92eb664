// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fire-and-forget dispatch of blocking unix operations.
//!
//! Long-running processes cannot afford to block their control loop on slow
//! kernel operations, but they also cannot leak the resources involved. This
//! crate dispatches two such operations off the calling thread:
//!
//! * [`asynchronous_sync`] forks a short-lived helper process that calls
//!   `sync(2)` and exits. A helper process rather than a thread, because a
//!   hung `sync(2)` in a child cannot keep the parent from exiting, while a
//!   hung thread would.
//! * [`asynchronous_close`] hands a file descriptor to a detached thread for
//!   closing, falling back to a synchronous `close(2)` if the thread cannot
//!   be spawned. The descriptor is closed exactly once on either path, and
//!   the calling thread's errno is left untouched.
//!
//! Nothing here is awaitable. Dispatch returns as soon as the background
//! vehicle (thread or process) exists; completion is observable only through
//! its effect on the descriptor table or the disk. Callers that do want to
//! collect the sync helper can hand its pid to [`reap_child_non_blocking`].

#![cfg(unix)]

mod close;
mod errno_guard;
mod fork;
mod job;
mod reap;
mod sync;

pub use close::{asynchronous_close, asynchronous_close_with};
pub use errno_guard::SavedErrno;
pub use fork::{safe_fork, Fork, ForkFlags};
pub use job::{spawn_detached, JobSpawner, SpawnError, ThreadSpawner};
pub use reap::{reap_child_non_blocking, ReapError, TimeoutManager};
pub use sync::asynchronous_sync;
