// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CRPT Document Throttle
//!
//! This crate rate-limits outbound document submissions to the CRPT API:
//!
//! - Fixed-window quota (N requests per window, default 10 per second)
//! - Callers wait for the next window instead of failing when the quota is spent
//! - Transient network failures are retried after one window, indefinitely by default
//! - Encoding failures are returned immediately
//! - Optional lifetime budget that closes the throttle once spent
//! - Optional FIFO ordering of callers waiting for quota

pub mod budget;
pub mod config;
pub mod document;
pub mod error;
pub mod metrics;
pub mod quota;
pub mod submitter;
pub mod throttle;

pub use config::{Config, RetryConfig, ThrottleConfig, TimeUnit};
pub use document::{Document, Product};
pub use error::{SubmitError, ThrottleError};
pub use quota::QuotaSnapshot;
pub use submitter::{DocumentSubmitter, HttpSubmitter, SubmitResponse};
pub use throttle::Throttle;
