// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::{Duration, Instant};

use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ReapError {
    #[error("Timeout waiting for child process to exit")]
    Timeout,
    #[error("Error waiting for child process to exit: {0}")]
    WaitError(#[from] nix::Error),
}

/// Wall-clock budget for reaping a dispatched child.
#[derive(Debug)]
pub struct TimeoutManager {
    start_time: Instant,
    timeout: Duration,
}

impl TimeoutManager {
    // 4ms per sched slice, keep ~4x10 slices even when the budget is spent.
    const MINIMUM_REAP_TIME: Duration = Duration::from_millis(160);

    pub fn new(timeout: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            timeout,
        }
    }

    pub fn remaining(&self) -> Duration {
        let elapsed = self.start_time.elapsed();
        if elapsed >= self.timeout {
            Self::MINIMUM_REAP_TIME
        } else {
            (self.timeout - elapsed).max(Self::MINIMUM_REAP_TIME)
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Non-blocking reap of a child this process owns, e.g. one dispatched by
/// [`asynchronous_sync`](crate::asynchronous_sync).
///
/// * `Ok(true)`: the child exited and its status was collected
/// * `Ok(false)`: no such child; someone else already collected it
/// * `Err(ReapError::Timeout)`: still alive when the budget ran out
pub fn reap_child_non_blocking(
    pid: Pid,
    timeout_manager: &TimeoutManager,
) -> Result<bool, ReapError> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {
                if timeout_manager.elapsed() > timeout_manager.timeout() {
                    return Err(ReapError::Timeout);
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok(_status) => return Ok(true),
            Err(nix::Error::ECHILD) => {
                // We should have exclusive reaping rights over children we
                // forked, so this is odd, but there is nothing left to do.
                return Ok(false);
            }
            Err(e) => return Err(ReapError::WaitError(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reap_nonexistent_pid() {
        let manager = TimeoutManager::new(Duration::from_millis(10));
        let result = reap_child_non_blocking(Pid::from_raw(999_999), &manager);
        assert!(matches!(result, Ok(false)));
    }

    #[test]
    fn test_reap_sync_child() {
        let pid = crate::asynchronous_sync().unwrap();
        let manager = TimeoutManager::new(Duration::from_secs(30));
        assert!(reap_child_non_blocking(pid, &manager).unwrap());
    }

    #[test]
    fn test_remaining_never_drops_below_floor() {
        let manager = TimeoutManager::new(Duration::ZERO);
        assert!(manager.remaining() >= TimeoutManager::MINIMUM_REAP_TIME);
        assert_eq!(manager.timeout(), Duration::ZERO);
    }
}
