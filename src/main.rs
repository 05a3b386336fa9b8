// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CRPT Document Submission Client
//!
//! Reads documents from a JSON file (a single document or an array) and
//! submits them concurrently through the throttle. Exits once every
//! document has been handled, or early when the submission budget is spent.
//!
//! ## Configuration
//!
//! Environment variables (a `.env` file is honoured), overridden by flags:
//!
//! - `CRPT_API_URL`: document creation endpoint
//! - `CRPT_TIMEOUT_MS`: per-request timeout (default: 30000)
//! - `THROTTLE_TIME_UNIT`: window length, second/minute/hour/day (default: second)
//! - `THROTTLE_WINDOW_MS`: explicit window length, overrides the time unit
//! - `THROTTLE_REQUEST_LIMIT`: requests per window (default: 10)
//! - `THROTTLE_TOTAL_BUDGET`: successful submissions before shutdown (default: unlimited)
//! - `THROTTLE_MAX_ATTEMPTS`: attempts per document (default: unlimited)
//! - `THROTTLE_RETRY_DELAY_MS`: delay between attempts (default: one window)
//! - `THROTTLE_RETRY_JITTER`: add up to 30% jitter to the delay (default: false)
//! - `THROTTLE_FAIR`: serve waiting callers in arrival order (default: false)
//! - `METRICS_ENABLED`: collect Prometheus metrics (default: true)

use anyhow::Context;
use clap::Parser;
use crpt_throttle::{
    config::{Config, TimeUnit},
    metrics::ThrottleMetrics,
    Document, HttpSubmitter, Throttle,
};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "crpt-submit", about = "Submit documents to the CRPT API within a request quota")]
struct Args {
    /// JSON file holding one document or an array of documents
    input: PathBuf,

    /// Document creation endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Window length: second, minute, hour or day
    #[arg(long)]
    time_unit: Option<TimeUnit>,

    /// Requests permitted per window
    #[arg(long)]
    limit: Option<u32>,

    /// Successful submissions before the client stops
    #[arg(long)]
    budget: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Many(Vec<Document>),
    One(Box<Document>),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = load_config();
    if let Some(endpoint) = args.endpoint {
        config.api.endpoint = endpoint;
    }
    if let Some(time_unit) = args.time_unit {
        config.throttle.time_unit = time_unit;
        config.throttle.window_ms = None;
    }
    if let Some(limit) = args.limit {
        config.throttle.request_limit = limit;
    }
    if let Some(budget) = args.budget {
        config.throttle.total_budget = Some(budget);
    }

    info!(
        endpoint = %config.api.endpoint,
        window = ?config.throttle.window(),
        request_limit = config.throttle.request_limit,
        total_budget = ?config.throttle.total_budget,
        max_attempts = ?config.throttle.retry.max_attempts,
        fair = config.throttle.fair,
        "Starting document submission"
    );

    let raw = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("reading {}", args.input.display()))?;
    let documents = match serde_json::from_slice::<Input>(&raw)
        .with_context(|| format!("parsing {}", args.input.display()))?
    {
        Input::Many(documents) => documents,
        Input::One(document) => vec![*document],
    };

    let submitter = HttpSubmitter::new(&config.api)?;
    let throttle = if config.metrics.enabled {
        Throttle::with_metrics(&config.throttle, submitter, ThrottleMetrics::new()?)?
    } else {
        Throttle::new(&config.throttle, submitter)?
    };

    // Ctrl-C closes the throttle; requests on the wire still finish
    let signal_throttle = throttle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, closing throttle");
            signal_throttle.shutdown();
        }
    });

    let mut tasks = JoinSet::new();
    for document in documents {
        let throttle = throttle.clone();
        tasks.spawn(async move {
            let result = throttle.submit(&document).await;
            (document.doc_id, result)
        });
    }

    let (mut succeeded, mut failed) = (0usize, 0usize);
    let mut closing = false;
    loop {
        tokio::select! {
            joined = tasks.join_next() => match joined {
                None => break,
                Some(Ok((doc_id, Ok(response)))) => {
                    succeeded += 1;
                    info!(%doc_id, status = response.status, "Document accepted");
                    debug!(%doc_id, body = %response.body, "Response body");
                }
                Some(Ok((doc_id, Err(err)))) => {
                    failed += 1;
                    error!(%doc_id, error = %err, "Document not submitted");
                }
                Some(Err(err)) => {
                    failed += 1;
                    error!(error = %err, "Submission task failed");
                }
            },
            _ = throttle.closed(), if !closing => {
                closing = true;
                info!("Throttle closed, draining in-flight submissions");
            }
        }
    }

    if let Some(metrics) = throttle.metrics() {
        debug!(metrics = %metrics.gather_text()?, "Final metrics");
    }
    info!(succeeded, failed, "Document submission finished");

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    Config::from_vars(|name| std::env::var(name).ok())
}
