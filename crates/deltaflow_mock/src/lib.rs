//! # Deltaflow Mock
//! [![Crates.io](https://img.shields.io/crates/v/deltaflow_mock.svg)](https://crates.io/crates/deltaflow_mock)
//! [![Downloads](https://img.shields.io/crates/d/deltaflow_mock.svg)](https://crates.io/crates/deltaflow_mock)
//! [![Docs](https://docs.rs/deltaflow_mock/badge.svg)](https://docs.rs/deltaflow_mock/)
//!
//! An in-memory [`JobProvider`] for development and testing.
//!
//! Jobs and runs live in a shared map, ids are handed out sequentially and
//! every provider call is recorded so tests can assert which calls were (or
//! were not) made.
//!
//! **DO NOT use this in production!!!**
//!
//! ## Usage
//!
//! ```rust
//! # use deltaflow_mock::MockProvider;
//! # fn main() {
//! let provider = MockProvider::default();
//! # }
//! ```

use deltaflow_core::prelude::*;

use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    inner: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<String>,
    jobs: HashMap<String, JobSpec>,
    runs: HashMap<String, Run>,
    logs: HashMap<String, Vec<LogOutput>>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{kind}-{}", self.next_id)
    }
}

impl MockProvider {
    /// Every provider call made so far, e.g. `"create_job"`, `"get_run run-1"`.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Registers a pre-existing job, returning its id.
    pub fn seed_job(&self, id: impl Into<String>, spec: JobSpec) -> String {
        let id = id.into();
        self.inner.lock().unwrap().jobs.insert(id.clone(), spec);
        id
    }

    /// Registers a pre-existing run in the given state, returning its id.
    pub fn seed_run(&self, id: impl Into<String>, job_id: &str, state: RunState) -> String {
        let id = id.into();
        let run = Run {
            id: id.clone(),
            job_id: job_id.to_string(),
            state,
        };
        self.inner.lock().unwrap().runs.insert(id.clone(), run);
        id
    }

    /// Queues log records that `watch_run` will replay for the given run.
    pub fn push_log(&self, run_id: &str, message: impl Into<String>) {
        let record = LogOutput {
            source: LogSource::Stdout,
            timestamp: None,
            message: message.into(),
        };
        self.inner
            .lock()
            .unwrap()
            .logs
            .entry(run_id.to_string())
            .or_default()
            .push(record);
    }

    pub fn job_exists(&self, id: &str) -> bool {
        self.inner.lock().unwrap().jobs.contains_key(id)
    }

    pub fn run_exists(&self, id: &str) -> bool {
        self.inner.lock().unwrap().runs.contains_key(id)
    }

    fn record(&self, call: impl Into<String>) {
        self.inner.lock().unwrap().calls.push(call.into());
    }
}

impl JobProvider for MockProvider {
    async fn create_job(&self, spec: &JobSpec, overwrite: bool) -> Result<Job, ProviderError> {
        self.record("create_job");

        let mut state = self.inner.lock().unwrap();
        if !overwrite {
            let clash = state.jobs.values().any(|existing| existing.name == spec.name);
            if clash {
                return Err(ProviderError::Api {
                    status: 409,
                    message: format!("job '{}' already exists", spec.name),
                });
            }
        }

        let id = state.next_id("job");
        state.jobs.insert(id.clone(), spec.clone());
        Ok(Job {
            id,
            spec: spec.clone(),
        })
    }

    async fn get_job(&self, id: &str) -> Result<Job, ProviderError> {
        self.record(format!("get_job {id}"));

        let state = self.inner.lock().unwrap();
        let spec = state
            .jobs
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))?;
        Ok(Job {
            id: id.to_string(),
            spec,
        })
    }

    async fn delete_job(&self, id: &str) -> Result<(), ProviderError> {
        self.record(format!("delete_job {id}"));

        let mut state = self.inner.lock().unwrap();
        state
            .jobs
            .remove(id)
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))?;
        // Cascade, like the real service does.
        state.runs.retain(|_, run| run.job_id != id);
        Ok(())
    }

    async fn submit_run(&self, job_id: &str) -> Result<Run, ProviderError> {
        self.record(format!("submit_run {job_id}"));

        let mut state = self.inner.lock().unwrap();
        if !state.jobs.contains_key(job_id) {
            return Err(ProviderError::NotFound(job_id.to_string()));
        }

        let id = state.next_id("run");
        let run = Run {
            id: id.clone(),
            job_id: job_id.to_string(),
            state: RunState::Accepted,
        };
        state.runs.insert(id, run.clone());
        Ok(run)
    }

    async fn get_run(&self, id: &str) -> Result<Run, ProviderError> {
        self.record(format!("get_run {id}"));

        let state = self.inner.lock().unwrap();
        state
            .runs
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }

    async fn delete_run(&self, id: &str) -> Result<(), ProviderError> {
        self.record(format!("delete_run {id}"));

        let mut state = self.inner.lock().unwrap();
        state
            .runs
            .remove(id)
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))?;
        Ok(())
    }

    async fn watch_run(
        &self,
        id: &str,
    ) -> Result<BoxStream<'static, Result<LogOutput, ProviderError>>, ProviderError> {
        self.record(format!("watch_run {id}"));

        let state = self.inner.lock().unwrap();
        if !state.runs.contains_key(id) {
            return Err(ProviderError::NotFound(id.to_string()));
        }

        let records = state.logs.get(id).cloned().unwrap_or_default();
        Ok(stream::iter(records.into_iter().map(Ok)).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_and_cascades_job_deletion() {
        let provider = MockProvider::default();

        let job = provider.create_job(&JobSpec::default(), false).await.unwrap();
        let run = provider.submit_run(&job.id).await.unwrap();
        provider.delete_job(&job.id).await.unwrap();

        assert!(!provider.run_exists(&run.id));
        assert_eq!(
            provider.calls(),
            vec![
                "create_job".to_string(),
                format!("submit_run {}", job.id),
                format!("delete_job {}", job.id),
            ]
        );
    }

    #[tokio::test]
    async fn create_without_overwrite_rejects_name_clash() {
        let provider = MockProvider::default();
        let spec = JobSpec {
            name: "daily".into(),
            ..Default::default()
        };

        provider.create_job(&spec, false).await.unwrap();
        let err = provider.create_job(&spec, false).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 409, .. }));

        provider.create_job(&spec, true).await.unwrap();
    }
}
