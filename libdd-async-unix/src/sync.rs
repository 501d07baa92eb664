// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use nix::unistd::Pid;

use crate::fork::{safe_fork, Fork, ForkFlags};

/// Kicks off a whole-filesystem `sync(2)` in a short-lived helper process
/// and returns its pid without waiting for the sync to finish.
///
/// A helper process rather than a thread: `sync(2)` can block indefinitely
/// on a wedged disk, and a child stuck that way cannot keep this process
/// from exiting, while a stuck thread would. The child starts from a clean
/// slate (signals reset, every descriptor above stderr closed, named
/// `dd-sync` for diagnostics), calls `sync(2)` best effort and exits 0.
///
/// The caller may collect the pid with
/// [`reap_child_non_blocking`](crate::reap_child_non_blocking) or ignore it
/// and leave the zombie to whoever reaps children in this process.
pub fn asynchronous_sync() -> nix::Result<Pid> {
    match safe_fork(c"dd-sync", ForkFlags::ALL)? {
        Fork::Parent(pid) => Ok(pid),
        Fork::Child => {
            // SAFETY: sync and _exit are async-signal-safe. sync(2) has no
            // meaningful return value to check.
            unsafe {
                libc::sync();
                libc::_exit(libc::EXIT_SUCCESS)
            }
        }
    }
}
