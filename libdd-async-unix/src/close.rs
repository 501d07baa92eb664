// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::os::fd::{IntoRawFd, OwnedFd, RawFd};

use crate::errno_guard::SavedErrno;
use crate::job::{JobSpawner, ThreadSpawner};

/// Closes `fd` on a detached background thread.
///
/// Ownership of the descriptor moves into the call; `None` means there is
/// nothing to close and is a no-op. For `Some(fd)` the descriptor is closed
/// exactly once, by the `dd-close` thread normally, or synchronously on the
/// calling thread if the thread cannot be spawned. Either way nothing is
/// reported back: closing is infallible from the caller's point of view,
/// with one exception. A close failing with `EBADF` means the descriptor
/// was already closed by someone else, and that use-after-close bug aborts
/// the process instead of returning.
///
/// The calling thread's errno is preserved across the call, so this is safe
/// to use in cleanup paths that are still in the middle of handling an
/// error.
pub fn asynchronous_close(fd: Option<OwnedFd>) {
    asynchronous_close_with(&ThreadSpawner, fd)
}

/// [`asynchronous_close`] with an injected thread-spawning capability.
pub fn asynchronous_close_with<S: JobSpawner>(spawner: &S, fd: Option<OwnedFd>) {
    let Some(fd) = fd else {
        return;
    };

    let _errno = SavedErrno::capture();

    // From here on exactly one of the two paths below owns and closes `raw`.
    let raw = fd.into_raw_fd();
    if let Err(err) = spawner.spawn("dd-close", Box::new(move || close_nointr(raw))) {
        log::debug!("no thread for closing fd {raw}, closing synchronously: {err}");
        close_nointr(raw);
    }
}

/// One `close(2)`, with `EINTR`-class failures ignored.
///
/// On Linux the descriptor is gone whatever `close(2)` returns, so an error
/// leaves nothing to act on, with one exception: `EBADF` means the
/// descriptor was not ours to close and the descriptor bookkeeping is
/// corrupt somewhere upstream. That is a bug, not a runtime condition, and
/// it aborts the whole process. A panic would only take down the detached
/// closer thread, and the corrupt descriptor table cannot be recovered
/// locally anyway.
fn close_nointr(fd: RawFd) {
    // SAFETY: sole ownership of `fd` was transferred in by the dispatcher
    // above; it is closed exactly once, here.
    let rc = unsafe { libc::close(fd) };
    if rc < 0 {
        let err = errno::errno();
        if err.0 == libc::EBADF {
            log::error!("close({fd}) reported EBADF, double close or stray descriptor");
            std::process::abort();
        }
        log::debug!("close({fd}) failed, descriptor is gone regardless: {err}");
    }
}
