// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window request quota.
//!
//! A window opens with `limit` slots. Each acquisition consumes one slot for
//! the rest of the window; slots are only replenished when an acquisition
//! or snapshot observes that the window has elapsed, at which point a new
//! window opens at the observation time.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of a quota acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// A slot was consumed
    Granted {
        /// Slots left in the current window
        remaining: u32,
    },
    /// No slot left in the current window
    Exhausted {
        /// When the current window ends
        retry_at: Instant,
    },
}

/// Point-in-time view of the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub limit: u32,
    pub available: u32,
    pub window: Duration,
    /// Time until the current window ends
    pub resets_in: Duration,
}

#[derive(Debug)]
struct Window {
    available: u32,
    start: Instant,
}

impl Window {
    /// Open a new window if the current one has elapsed.
    fn roll(&mut self, now: Instant, limit: u32, length: Duration) {
        if now >= self.start + length {
            self.start = now;
            self.available = limit;
        }
    }
}

/// Thread-safe fixed-window quota.
///
/// The expiry check and the decrement happen under one short lock; the lock
/// is never held across an await point.
#[derive(Debug)]
pub struct Quota {
    limit: u32,
    window: Duration,
    state: Mutex<Window>,
}

impl Quota {
    /// Create a quota with a full window starting now.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(Window {
                available: limit,
                start: Instant::now(),
            }),
        }
    }

    /// Slots granted per window
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Window length
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Try to consume one slot without waiting.
    pub fn try_acquire(&self) -> Acquire {
        let now = Instant::now();
        let mut state = self.state.lock();
        state.roll(now, self.limit, self.window);

        if state.available > 0 {
            state.available -= 1;
            Acquire::Granted {
                remaining: state.available,
            }
        } else {
            Acquire::Exhausted {
                retry_at: state.start + self.window,
            }
        }
    }

    /// Current availability, resetting the window if it has elapsed.
    pub fn snapshot(&self) -> QuotaSnapshot {
        let now = Instant::now();
        let mut state = self.state.lock();
        state.roll(now, self.limit, self.window);

        QuotaSnapshot {
            limit: self.limit,
            available: state.available,
            window: self.window,
            resets_in: (state.start + self.window).saturating_duration_since(now),
        }
    }
}
