// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use errno::{errno, set_errno, Errno};

/// Scoped snapshot of the calling thread's errno.
///
/// Captures errno on construction and puts it back on drop, so a
/// sub-operation that scribbles on errno as a side effect stays invisible to
/// error handling already in progress on this thread. Restoration also runs
/// when the scope unwinds.
#[derive(Debug)]
pub struct SavedErrno(Errno);

impl SavedErrno {
    pub fn capture() -> Self {
        Self(errno())
    }
}

impl Drop for SavedErrno {
    fn drop(&mut self) {
        set_errno(self.0);
    }
}
