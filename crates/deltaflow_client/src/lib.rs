//! # Deltaflow Client
//! [![Crates.io](https://img.shields.io/crates/v/deltaflow_client.svg)](https://crates.io/crates/deltaflow_client)
//! [![Downloads](https://img.shields.io/crates/d/deltaflow_client.svg)](https://crates.io/crates/deltaflow_client)
//! [![Docs](https://docs.rs/deltaflow_client/badge.svg)](https://docs.rs/deltaflow_client/)
//!
//! An async HTTP [`JobProvider`] for a managed dataflow service.
//!
//! Each call is a single request/response exchange against the service's
//! resource API, authenticated through a [`Signer`] resolved once at
//! construction. Remote failures are surfaced as
//! [`ProviderError`](deltaflow_core::error::ProviderError) without
//! translation; only transport-level hiccups inside the log stream are
//! retried, with a bounded counter.

pub mod signer;

pub use signer::Signer;

use deltaflow_core::prelude::*;
use deltaflow_core::routes;

use chrono::TimeZone;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Poll interval of the watch loop.
const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Consecutive transport failures tolerated before the watch stream fails.
const MAX_TRANSIENT_ERRORS: u32 = 15;

#[derive(Clone)]
pub struct RestJobProvider {
    base_url: String,
    client: Client,
    signer: Signer,
}

impl RestJobProvider {
    pub fn new(base_url: impl Into<String>, signer: Signer) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
            signer,
        }
    }

    /// Resolves a signer from the execution section and builds the client.
    ///
    /// This is the composed constructor used by the CLI: a bad auth mode or
    /// unreadable api-key profile fails here, before any operation runs.
    pub fn from_execution(
        endpoint: impl Into<String>,
        execution: &ExecutionConfig,
    ) -> Result<Self, AuthError> {
        let mode = match execution.auth.as_deref() {
            Some(key) => key.parse::<AuthMode>()?,
            None => AuthMode::default(),
        };
        let signer = Signer::new(
            mode,
            execution.auth_config.as_deref(),
            execution.auth_profile.as_deref(),
        )?;

        Ok(Self::new(endpoint, signer))
    }

    fn auth_request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("Authorization", self.signer.auth_header())
    }

    fn url(&self, route: &str, id: Option<&str>) -> String {
        let path = match id {
            Some(id) => route.replace("{id}", id),
            None => route.to_string(),
        };
        format!("{}{}", self.base_url, path)
    }

    async fn error_for(response: reqwest::Response, resource: &str) -> ProviderError {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return ProviderError::NotFound(resource.to_string());
        }

        let message = response.text().await.unwrap_or_default();
        ProviderError::Api {
            status: status.as_u16(),
            message,
        }
    }

    async fn fetch_logs(&self, run_id: &str, offset: u64) -> Result<LogPage, ProviderError> {
        let url = self.url(routes::RUNS_LOGS, Some(run_id));
        let response = self
            .auth_request(self.client.get(&url))
            .query(&[("offset", offset)])
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, run_id).await);
        }

        response.json().await.map_err(network)
    }
}

fn network(e: reqwest::Error) -> ProviderError {
    ProviderError::Network(e.to_string())
}

#[derive(Deserialize)]
struct LogPage {
    events: Vec<LogEvent>,
    next_offset: u64,
}

#[derive(Deserialize)]
struct LogEvent {
    timestamp_ms: Option<i64>,
    source: Option<String>,
    message: String,
}

impl From<LogEvent> for LogOutput {
    fn from(event: LogEvent) -> Self {
        let timestamp = event.timestamp_ms.and_then(|ms| {
            chrono::Utc
                .timestamp_millis_opt(ms)
                .single()
                .map(|ts| ts.to_rfc3339())
        });

        let source = match event.source.as_deref() {
            Some("stderr") => LogSource::Stderr,
            Some("console") => LogSource::Console,
            _ => LogSource::Stdout,
        };

        LogOutput {
            source,
            timestamp,
            message: event.message,
        }
    }
}

impl JobProvider for RestJobProvider {
    async fn create_job(&self, spec: &JobSpec, overwrite: bool) -> Result<Job, ProviderError> {
        let url = self.url(routes::JOBS, None);
        let response = self
            .auth_request(self.client.post(&url))
            .query(&[("overwrite", overwrite)])
            .json(spec)
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, &spec.name).await);
        }

        response.json().await.map_err(network)
    }

    async fn get_job(&self, id: &str) -> Result<Job, ProviderError> {
        let url = self.url(routes::JOBS_BY_ID, Some(id));
        let response = self
            .auth_request(self.client.get(&url))
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, id).await);
        }

        response.json().await.map_err(network)
    }

    async fn delete_job(&self, id: &str) -> Result<(), ProviderError> {
        let url = self.url(routes::JOBS_BY_ID, Some(id));
        let response = self
            .auth_request(self.client.delete(&url))
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, id).await);
        }

        Ok(())
    }

    async fn submit_run(&self, job_id: &str) -> Result<Run, ProviderError> {
        let url = self.url(routes::JOBS_SUBMIT_RUN, Some(job_id));
        let response = self
            .auth_request(self.client.post(&url))
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, job_id).await);
        }

        response.json().await.map_err(network)
    }

    async fn get_run(&self, id: &str) -> Result<Run, ProviderError> {
        let url = self.url(routes::RUNS_BY_ID, Some(id));
        let response = self
            .auth_request(self.client.get(&url))
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, id).await);
        }

        response.json().await.map_err(network)
    }

    async fn delete_run(&self, id: &str) -> Result<(), ProviderError> {
        let url = self.url(routes::RUNS_BY_ID, Some(id));
        let response = self
            .auth_request(self.client.delete(&url))
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, id).await);
        }

        Ok(())
    }

    async fn watch_run(
        &self,
        id: &str,
    ) -> Result<BoxStream<'static, Result<LogOutput, ProviderError>>, ProviderError> {
        // Fail fast on a bad id instead of inside the stream.
        let run = self.get_run(id).await?;
        tracing::debug!(run_id = %run.id, state = ?run.state, "watching run logs");

        let state = WatchState {
            provider: self.clone(),
            run_id: run.id,
            offset: 0,
            buffer: VecDeque::new(),
            finished: run.state.is_terminal(),
            error_count: 0,
        };

        let stream = stream::unfold(state, |mut state| async move {
            loop {
                if state.error_count > MAX_TRANSIENT_ERRORS {
                    return Some((
                        Err(ProviderError::Network("Too many transient errors".into())),
                        state,
                    ));
                }

                if let Some(log) = state.buffer.pop_front() {
                    return Some((Ok(log), state));
                }

                match state.provider.fetch_logs(&state.run_id, state.offset).await {
                    Ok(page) => {
                        state.error_count = 0;
                        state.offset = page.next_offset;
                        state
                            .buffer
                            .extend(page.events.into_iter().map(LogOutput::from));
                    }
                    Err(ProviderError::Network(e)) => {
                        state.error_count += 1;
                        tracing::warn!(error = %e, "transient error fetching logs, retrying");
                        tokio::time::sleep(POLL_INTERVAL).await;
                        continue;
                    }
                    Err(e) => return Some((Err(e), state)),
                }

                if !state.buffer.is_empty() {
                    continue;
                }

                if state.finished {
                    return None;
                }

                // No new records yet; re-check the run state before waiting.
                match state.provider.get_run(&state.run_id).await {
                    Ok(run) => {
                        state.error_count = 0;
                        if run.state.is_terminal() {
                            state.finished = true;
                            continue;
                        }
                    }
                    Err(ProviderError::Network(e)) => {
                        state.error_count += 1;
                        tracing::warn!(error = %e, "transient error checking run state, retrying");
                    }
                    Err(e) => return Some((Err(e), state)),
                }

                tokio::time::sleep(POLL_INTERVAL).await;
            }
        });

        Ok(stream.boxed())
    }
}

struct WatchState {
    provider: RestJobProvider,
    run_id: String,
    offset: u64,
    buffer: VecDeque<LogOutput>,
    finished: bool,
    error_count: u32,
}
