// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for document submission and the request throttle.

use thiserror::Error;

/// Failure reported by a [`DocumentSubmitter`](crate::submitter::DocumentSubmitter).
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Failed to encode document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl SubmitError {
    /// Whether the failure is worth retrying.
    ///
    /// Network and I/O failures are transient. Encoding failures, malformed
    /// endpoints and request-building errors are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(err) => !err.is_builder(),
            Self::Io(_) => true,
            Self::Serialization(_) | Self::InvalidEndpoint(_) => false,
        }
    }
}

/// Error returned by [`Throttle::submit`](crate::throttle::Throttle::submit).
#[derive(Debug, Error)]
pub enum ThrottleError {
    /// The throttle no longer accepts work: the submission budget ran out or
    /// `shutdown` was called.
    #[error("Throttle is closed")]
    Closed,

    #[error("Submission failed permanently: {0}")]
    Permanent(#[source] SubmitError),

    /// Only reachable when the retry policy sets `max_attempts`.
    #[error("Submission failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: SubmitError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ThrottleError>;
