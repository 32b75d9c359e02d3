//! Repeatedly ask an endpoint about a job until it reports `complete`.
//!
//! The loop issues one request per tick and waits for it before the next
//! tick, so completion can only be observed once per poll. A poll stops for
//! good on the first transport or decode failure; the callback is not run in
//! that case and the failure is returned from [`PollHandle::join`].

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use pubtrawlr_types::PollStatus;

use crate::error::{ApiError, ApiResult};
use crate::http::read_json;

/// How a poll ended.
#[derive(Debug)]
pub enum PollOutcome {
    /// The job reported `complete` and the callback ran.
    Completed,
    /// A request failed. No further requests were made.
    Failed(ApiError),
    /// The handle was cancelled before the job completed.
    Cancelled,
}

/// A running poll.
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    /// Stop polling. A response already in flight is discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this poll, usable after the handle is consumed
    /// by [`PollHandle::join`].
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the poll to end. A panic raised by the callback is resumed
    /// here.
    pub async fn join(self) -> PollOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => {
                error!("Poll callback panicked");
                std::panic::resume_unwind(e.into_panic())
            }
            Err(e) => {
                error!("Poll task ended abnormally: {}", e);
                PollOutcome::Cancelled
            }
        }
    }
}

/// Start polling `endpoint` every `interval`. The first request goes out one
/// interval from now. `callback` receives the full payload of the first
/// response whose `status` is `complete`.
pub fn poll_until_complete<F>(
    http: Client,
    endpoint: impl Into<String>,
    interval: Duration,
    callback: F,
) -> PollHandle
where
    F: FnOnce(Value) + Send + 'static,
{
    let cancel = CancellationToken::new();
    let task = tokio::spawn(run(http, endpoint.into(), interval, callback, cancel.clone()));
    PollHandle { cancel, task }
}

async fn run<F>(
    http: Client,
    endpoint: String,
    interval: Duration,
    callback: F,
    cancel: CancellationToken,
) -> PollOutcome
where
    F: FnOnce(Value),
{
    let interval = interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return cancelled(&endpoint, ticks),
            _ = ticker.tick() => {}
        }
        ticks += 1;

        let result = tokio::select! {
            _ = cancel.cancelled() => return cancelled(&endpoint, ticks),
            result = fetch(&http, &endpoint) => result,
        };

        // Late responses after cancellation are dropped
        if cancel.is_cancelled() {
            return cancelled(&endpoint, ticks);
        }

        match result {
            Ok(payload) => {
                let status = PollStatus::of(&payload);
                if status.is_complete() {
                    cancel.cancel();
                    info!(endpoint = %endpoint, ticks, "Poll complete");
                    callback(payload);
                    return PollOutcome::Completed;
                }
                debug!(endpoint = %endpoint, ticks, ?status, "Poll pending");
            }
            Err(e) => {
                cancel.cancel();
                warn!(endpoint = %endpoint, ticks, "Poll stopped: {}", e);
                return PollOutcome::Failed(e);
            }
        }
    }
}

async fn fetch(http: &Client, endpoint: &str) -> ApiResult<Value> {
    let resp = http
        .post(endpoint)
        .header(CONTENT_TYPE, "application/json")
        .send()
        .await?;
    read_json(resp).await
}

fn cancelled(endpoint: &str, ticks: u64) -> PollOutcome {
    debug!(endpoint = %endpoint, ticks, "Poll cancelled");
    PollOutcome::Cancelled
}
