// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scripted submitters that record every call.

use async_trait::async_trait;
use crpt_throttle::{Document, DocumentSubmitter, SubmitError, SubmitResponse};
use parking_lot::Mutex;
use std::io;
use std::time::Duration;
use tokio::time::Instant;

/// How a scripted submitter answers.
#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    /// Always succeed
    Accept,
    /// Fail transiently for the first `n` calls, then succeed
    FailTransiently(usize),
    /// Always fail transiently
    AlwaysTransient,
    /// Always fail with an encoding error
    Permanent,
}

/// One recorded call.
#[derive(Debug, Clone)]
pub struct Call {
    pub doc_id: String,
    pub at: Instant,
}

/// Submitter that answers according to a [`Behaviour`] and records calls.
pub struct ScriptedSubmitter {
    behaviour: Behaviour,
    latency: Duration,
    started: Instant,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedSubmitter {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            latency: Duration::ZERO,
            started: Instant::now(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Builder-style: simulate network latency on every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Offsets of each call from submitter creation.
    pub fn call_offsets(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .iter()
            .map(|call| call.at.duration_since(self.started))
            .collect()
    }

    /// Calls made strictly before `offset` from submitter creation.
    pub fn calls_before(&self, offset: Duration) -> usize {
        self.call_offsets().into_iter().filter(|at| *at < offset).count()
    }
}

#[async_trait]
impl DocumentSubmitter for ScriptedSubmitter {
    async fn submit(&self, document: &Document) -> Result<SubmitResponse, SubmitError> {
        let call_number = {
            let mut calls = self.calls.lock();
            calls.push(Call {
                doc_id: document.doc_id.clone(),
                at: Instant::now(),
            });
            calls.len()
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let transient = || {
            SubmitError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))
        };

        match self.behaviour {
            Behaviour::Accept => Ok(accepted(document)),
            Behaviour::FailTransiently(n) if call_number <= n => Err(transient()),
            Behaviour::FailTransiently(_) => Ok(accepted(document)),
            Behaviour::AlwaysTransient => Err(transient()),
            Behaviour::Permanent => {
                let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                Err(SubmitError::Serialization(err))
            }
        }
    }
}

fn accepted(document: &Document) -> SubmitResponse {
    SubmitResponse {
        status: 200,
        body: format!(r#"{{"value":"{}"}}"#, document.doc_id),
    }
}
