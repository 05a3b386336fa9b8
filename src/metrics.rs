// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the throttle.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Terminal outcome of a `submit` call, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    PermanentFailure,
    RetriesExhausted,
    Rejected,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PermanentFailure => "permanent_failure",
            Self::RetriesExhausted => "retries_exhausted",
            Self::Rejected => "rejected",
        }
    }
}

/// Counters and gauges describing throttle activity.
#[derive(Debug, Clone)]
pub struct ThrottleMetrics {
    registry: Registry,
    submissions: IntCounterVec,
    quota_waits: IntCounter,
    transient_retries: IntCounter,
    quota_available: IntGauge,
}

impl ThrottleMetrics {
    /// Create metrics in a private registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Create metrics and register them in `registry`.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let submissions = IntCounterVec::new(
            Opts::new(
                "document_submissions_total",
                "Completed submit calls by outcome",
            ),
            &["outcome"],
        )?;
        let quota_waits = IntCounter::new(
            "document_quota_waits_total",
            "Times a caller waited for the quota window to reset",
        )?;
        let transient_retries = IntCounter::new(
            "document_transient_retries_total",
            "Submission attempts retried after a transient failure",
        )?;
        let quota_available = IntGauge::new(
            "document_quota_available",
            "Slots left in the current quota window",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(quota_waits.clone()))?;
        registry.register(Box::new(transient_retries.clone()))?;
        registry.register(Box::new(quota_available.clone()))?;

        Ok(Self {
            registry,
            submissions,
            quota_waits,
            transient_retries,
            quota_available,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn record_outcome(&self, outcome: Outcome) {
        self.submissions.with_label_values(&[outcome.label()]).inc();
    }

    pub(crate) fn record_quota_wait(&self) {
        self.quota_waits.inc();
    }

    pub(crate) fn record_retry(&self) {
        self.transient_retries.inc();
    }

    pub(crate) fn set_available(&self, available: u32) {
        self.quota_available.set(i64::from(available));
    }

    /// Number of completed calls with the given outcome
    pub fn outcome_count(&self, outcome: Outcome) -> u64 {
        self.submissions.with_label_values(&[outcome.label()]).get()
    }

    pub fn quota_waits(&self) -> u64 {
        self.quota_waits.get()
    }

    pub fn transient_retries(&self) -> u64 {
        self.transient_retries.get()
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
