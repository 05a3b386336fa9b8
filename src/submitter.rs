// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Document submitters.
//!
//! A submitter encodes a document and performs the network exchange. The
//! throttle only sees the classified result.

use crate::config::ApiConfig;
use crate::document::Document;
use crate::error::SubmitError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Raw response from the target API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    pub status: u16,
    pub body: String,
}

impl SubmitResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single submission attempt.
#[async_trait]
pub trait DocumentSubmitter: Send + Sync {
    async fn submit(&self, document: &Document) -> Result<SubmitResponse, SubmitError>;
}

#[async_trait]
impl<T: DocumentSubmitter + ?Sized> DocumentSubmitter for Arc<T> {
    async fn submit(&self, document: &Document) -> Result<SubmitResponse, SubmitError> {
        (**self).submit(document).await
    }
}

/// Submits documents as JSON over HTTP POST.
///
/// Any HTTP status is returned as a response; only transport and encoding
/// failures before the status arrives become errors. A response body that
/// cannot be read is logged and returned empty.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpSubmitter {
    /// Create a submitter for the configured endpoint
    pub fn new(config: &ApiConfig) -> Result<Self, SubmitError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| SubmitError::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl DocumentSubmitter for HttpSubmitter {
    async fn submit(&self, document: &Document) -> Result<SubmitResponse, SubmitError> {
        let body = serde_json::to_vec(document)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        // The server has answered; a broken body must not resend the document
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(doc_id = %document.doc_id, status, error = %err, "Failed to read response body");
                String::new()
            }
        };
        debug!(doc_id = %document.doc_id, status, "Document submitted");

        Ok(SubmitResponse { status, body })
    }
}
