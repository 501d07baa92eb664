// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::ffi::CStr;

use nix::sys::signal::{self, SigHandler, SigSet, SigmaskHow, Signal};
use nix::unistd::{ForkResult, Pid};

/// Which side of the fork this process is on.
#[derive(Debug)]
pub enum Fork {
    /// The child. The caller runs its child code and must `_exit(2)`;
    /// returning into the parent's control flow is not an option.
    Child,
    /// The parent, holding the child's pid. The child is not reaped here.
    Parent(Pid),
}

/// Child-side setup applied before [`safe_fork`] returns [`Fork::Child`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForkFlags {
    /// Restore every catchable signal disposition to its default and clear
    /// the signal mask.
    pub reset_signals: bool,
    /// Close every inherited descriptor above stderr.
    pub close_all_fds: bool,
}

impl ForkFlags {
    pub const ALL: Self = Self {
        reset_signals: true,
        close_all_fds: true,
    };
}

/// Forks a helper process.
///
/// In the parent, returns [`Fork::Parent`] immediately. In the child,
/// renames the process to `name` (visible in `ps`/`comm` on Linux), applies
/// `flags` and returns [`Fork::Child`]. A fork failure is reported as the
/// raw [`nix::Error`], untouched.
///
/// The child branch performs only async-signal-safe work before handing
/// control back; the caller's child code is expected to do the same and to
/// terminate with `_exit(2)`.
pub fn safe_fork(name: &CStr, flags: ForkFlags) -> nix::Result<Fork> {
    // SAFETY: the child touches no shared state before returning to the
    // caller, and everything done below (prctl, sigaction, sigprocmask,
    // close) is async-signal-safe.
    match unsafe { nix::unistd::fork() }? {
        ForkResult::Parent { child } => Ok(Fork::Parent(child)),
        ForkResult::Child => {
            rename_process(name);
            if flags.reset_signals {
                reset_signals();
            }
            if flags.close_all_fds {
                close_all_fds();
            }
            Ok(Fork::Child)
        }
    }
}

#[cfg(target_os = "linux")]
fn rename_process(name: &CStr) {
    // SAFETY: PR_SET_NAME reads a NUL-terminated string, truncating to the
    // 16-byte comm limit.
    unsafe {
        libc::prctl(libc::PR_SET_NAME, name.as_ptr());
    }
}

#[cfg(not(target_os = "linux"))]
fn rename_process(_name: &CStr) {
    // No portable equivalent of PR_SET_NAME; the name is diagnostic only.
}

fn reset_signals() {
    for sig in Signal::iterator() {
        if matches!(sig, Signal::SIGKILL | Signal::SIGSTOP) {
            continue;
        }
        // SAFETY: restoring the default disposition installs no handler.
        let _ = unsafe { signal::signal(sig, SigHandler::SigDfl) };
    }
    let _ = signal::sigprocmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::empty()), None);
}

#[cfg(target_os = "linux")]
fn close_all_fds() {
    // SAFETY: close_range(2) takes no pointers.
    let rc = unsafe {
        libc::syscall(
            libc::SYS_close_range,
            (libc::STDERR_FILENO + 1) as libc::c_uint,
            libc::c_uint::MAX,
            0 as libc::c_uint,
        )
    };
    if rc != 0 {
        // Pre-5.9 kernels. Brute force is fine in a throwaway child.
        close_all_fds_fallback();
    }
}

#[cfg(not(target_os = "linux"))]
fn close_all_fds() {
    close_all_fds_fallback();
}

fn close_all_fds_fallback() {
    // SAFETY: sysconf takes no pointers.
    let limit = unsafe { libc::sysconf(libc::_SC_OPEN_MAX) };
    let limit = if limit < 0 { 1024 } else { limit };
    for fd in (libc::STDERR_FILENO + 1)..limit as libc::c_int {
        // SAFETY: best-effort close of descriptors we may not hold; errors
        // are ignored.
        unsafe {
            libc::close(fd);
        }
    }
}
