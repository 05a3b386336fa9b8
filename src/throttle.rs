// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request throttle for document submission.
//!
//! Each `submit` call moves through these states:
//!
//! - awaiting quota: takes a slot from the current window, sleeping until
//!   the window ends when none is left
//! - submitting: hands the document to the submitter
//! - awaiting retry: after a transient failure, sleeps for the retry delay
//!   and goes back to awaiting quota
//!
//! Success and permanent failure are terminal. Successful calls also draw
//! down the lifetime budget; the call that spends the last unit closes the
//! throttle. Once closed, new calls are rejected and calls still waiting
//! for quota or for a retry give up. Requests already on the wire finish
//! normally.

use crate::budget::Budget;
use crate::config::{RetryConfig, ThrottleConfig};
use crate::document::Document;
use crate::error::{Result, ThrottleError};
use crate::metrics::{Outcome, ThrottleMetrics};
use crate::quota::{Acquire, Quota, QuotaSnapshot};
use crate::submitter::{DocumentSubmitter, SubmitResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

struct Inner<S> {
    submitter: S,
    quota: Quota,
    budget: Budget,
    retry: RetryConfig,
    /// FIFO queue for callers waiting on quota, when fairness is enabled
    waiters: Option<Mutex<()>>,
    shutdown: watch::Sender<bool>,
    metrics: Option<ThrottleMetrics>,
}

/// Shared throttle in front of a [`DocumentSubmitter`].
///
/// Cloning is cheap; clones share quota, budget and shutdown state.
pub struct Throttle<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Throttle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DocumentSubmitter> Throttle<S> {
    /// Create a throttle without metrics.
    pub fn new(config: &ThrottleConfig, submitter: S) -> Result<Self> {
        Self::build(config, submitter, None)
    }

    /// Create a throttle that reports to `metrics`.
    pub fn with_metrics(
        config: &ThrottleConfig,
        submitter: S,
        metrics: ThrottleMetrics,
    ) -> Result<Self> {
        Self::build(config, submitter, Some(metrics))
    }

    fn build(
        config: &ThrottleConfig,
        submitter: S,
        metrics: Option<ThrottleMetrics>,
    ) -> Result<Self> {
        config.validate()?;

        if let Some(metrics) = &metrics {
            metrics.set_available(config.request_limit);
        }

        Ok(Self {
            inner: Arc::new(Inner {
                submitter,
                quota: Quota::new(config.request_limit, config.window()),
                budget: Budget::new(config.total_budget),
                retry: config.retry.clone(),
                waiters: config.fair.then(|| Mutex::new(())),
                shutdown: watch::channel(false).0,
                metrics,
            }),
        })
    }

    /// Submit a document, waiting for quota and retrying transient failures.
    ///
    /// With the default retry policy this only returns an error for a
    /// permanent failure or a closed throttle. Wrap the call in
    /// `tokio::time::timeout` to bound the wait.
    pub async fn submit(&self, document: &Document) -> Result<SubmitResponse> {
        if self.is_closed() {
            debug!(doc_id = %document.doc_id, "Rejecting submission, throttle closed");
            return self.finish(Outcome::Rejected, Err(ThrottleError::Closed));
        }

        let mut attempts: u32 = 0;
        loop {
            if let Err(err) = self.acquire_slot().await {
                return self.finish(Outcome::Rejected, Err(err));
            }

            attempts += 1;
            debug!(doc_id = %document.doc_id, attempts, "Submitting document");

            let err = match self.inner.submitter.submit(document).await {
                Ok(response) => {
                    self.record_success(document);
                    return self.finish(Outcome::Success, Ok(response));
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                warn!(doc_id = %document.doc_id, error = %err, "Submission failed permanently");
                return self.finish(Outcome::PermanentFailure, Err(ThrottleError::Permanent(err)));
            }

            if !self.inner.retry.allows_retry(attempts) {
                warn!(doc_id = %document.doc_id, attempts, error = %err, "Retry limit reached");
                return self.finish(
                    Outcome::RetriesExhausted,
                    Err(ThrottleError::RetriesExhausted {
                        attempts,
                        source: err,
                    }),
                );
            }

            let delay = self.inner.retry.delay(self.inner.quota.window());
            warn!(
                doc_id = %document.doc_id,
                attempts,
                error = %err,
                ?delay,
                "Transient submission failure, retrying"
            );
            if let Some(metrics) = &self.inner.metrics {
                metrics.record_retry();
            }

            if let Err(err) = self.sleep_until(Instant::now() + delay).await {
                return self.finish(Outcome::Rejected, Err(err));
            }
        }
    }

    /// Wait until a quota slot is ours.
    async fn acquire_slot(&self) -> Result<()> {
        // Held only while waiting for quota, never across the submission
        let _turn = match &self.inner.waiters {
            Some(waiters) => tokio::select! {
                guard = waiters.lock() => Some(guard),
                _ = self.closed() => return Err(ThrottleError::Closed),
            },
            None => None,
        };

        loop {
            if self.is_closed() {
                return Err(ThrottleError::Closed);
            }

            match self.inner.quota.try_acquire() {
                Acquire::Granted { remaining } => {
                    if let Some(metrics) = &self.inner.metrics {
                        metrics.set_available(remaining);
                    }
                    return Ok(());
                }
                Acquire::Exhausted { retry_at } => {
                    debug!(
                        wait = ?retry_at.saturating_duration_since(Instant::now()),
                        "Quota exhausted, waiting for window reset"
                    );
                    if let Some(metrics) = &self.inner.metrics {
                        metrics.set_available(0);
                        metrics.record_quota_wait();
                    }
                    self.sleep_until(retry_at).await?;
                }
            }
        }
    }

    /// Sleep until `deadline`, returning early if the throttle closes.
    async fn sleep_until(&self, deadline: Instant) -> Result<()> {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => Ok(()),
            _ = self.closed() => Err(ThrottleError::Closed),
        }
    }

    fn record_success(&self, document: &Document) {
        if self.inner.budget.record_success() {
            info!(doc_id = %document.doc_id, "Submission budget exhausted, closing throttle");
            self.shutdown();
        }
    }

    fn finish(
        &self,
        outcome: Outcome,
        result: Result<SubmitResponse>,
    ) -> Result<SubmitResponse> {
        if let Some(metrics) = &self.inner.metrics {
            metrics.record_outcome(outcome);
        }
        result
    }
}

impl<S> Throttle<S> {
    /// Stop accepting work. Idempotent.
    pub fn shutdown(&self) {
        if !self.inner.shutdown.send_replace(true) {
            info!("Throttle closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    /// Resolves once the throttle has closed, either through `shutdown` or
    /// because the submission budget ran out.
    pub async fn closed(&self) {
        let mut rx = self.inner.shutdown.subscribe();
        // The sender lives as long as `self`, so this cannot observe a drop
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Successful submissions left, or `None` when unlimited.
    pub fn remaining_budget(&self) -> Option<u64> {
        self.inner.budget.remaining()
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        self.inner.quota.snapshot()
    }

    pub fn window(&self) -> Duration {
        self.inner.quota.window()
    }

    pub fn metrics(&self) -> Option<&ThrottleMetrics> {
        self.inner.metrics.as_ref()
    }

    pub fn submitter(&self) -> &S {
        &self.inner.submitter
    }
}
