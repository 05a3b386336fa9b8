// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Lifetime submission budget, independent of the per-window quota.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts down successful submissions until the throttle must close.
#[derive(Debug)]
pub struct Budget {
    remaining: Option<AtomicU64>,
}

impl Budget {
    /// `None` means unlimited.
    pub fn new(total: Option<u64>) -> Self {
        Self {
            remaining: total.map(AtomicU64::new),
        }
    }

    /// Record one successful submission.
    ///
    /// Returns `true` for exactly one caller: the one whose success used up
    /// the last unit. The counter saturates at zero.
    pub fn record_success(&self) -> bool {
        match &self.remaining {
            Some(remaining) => remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .map_or(false, |previous| previous == 1),
            None => false,
        }
    }

    pub fn remaining(&self) -> Option<u64> {
        self.remaining
            .as_ref()
            .map(|remaining| remaining.load(Ordering::Acquire))
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == Some(0)
    }
}
