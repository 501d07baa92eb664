// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg(unix)]

use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

use ddasync::{asynchronous_close, asynchronous_sync, reap_child_non_blocking, TimeoutManager};

#[test]
fn close_then_probe_reports_bad_descriptor() {
    let (read, write) = nix::unistd::pipe().unwrap();
    let raw = read.as_raw_fd();

    asynchronous_close(Some(read));

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        // SAFETY: F_GETFD probes descriptor validity without side effects.
        let rc = unsafe { libc::fcntl(raw, libc::F_GETFD) };
        if rc == -1 {
            assert_eq!(errno::errno().0, libc::EBADF);
            break;
        }
        assert!(Instant::now() < deadline, "fd {raw} never closed");
        std::thread::sleep(Duration::from_millis(10));
    }

    // The end we kept still works.
    assert_eq!(nix::unistd::write(&write, b"x").unwrap(), 1);
}

#[test]
fn sync_child_is_reapable() {
    let pid = asynchronous_sync().unwrap();
    let manager = TimeoutManager::new(Duration::from_secs(30));
    assert!(reap_child_non_blocking(pid, &manager).unwrap());
}
