use crate::runtime_factory::RuntimeKind;
use crate::template;
use crate::Result;
use deltaflow_core::prelude::*;

use futures::StreamExt;
use std::io::Write;
use std::path::Path;

/// The backend adapter for a managed dataflow service.
///
/// Holds the resolved configuration and an authenticated provider handle.
/// Operations are sequential request/response exchanges; the adapter keeps no
/// mutable state of its own and must not be driven concurrently from multiple
/// tasks without external synchronization.
#[derive(Debug)]
pub struct DataflowBackend<P: JobProvider> {
    config: JobConfig,
    provider: P,
    auth_mode: AuthMode,
    profile: Option<String>,
}

/// The ids produced by a successful [`DataflowBackend::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSubmission {
    pub job_id: String,
    pub run_id: String,
}

impl<P: JobProvider> DataflowBackend<P> {
    /// Builds an adapter from a configuration and a provider handle.
    ///
    /// Fails with an auth error if `execution.auth` names an unknown mode.
    pub fn new(config: JobConfig, provider: P) -> Result<Self> {
        let auth_mode = match config.execution.auth.as_deref() {
            Some(key) => key.parse::<AuthMode>()?,
            None => AuthMode::default(),
        };
        let profile = config.execution.auth_profile.clone();

        Ok(Self {
            config,
            provider,
            auth_mode,
            profile,
        })
    }

    fn auth_scope(&self) -> AuthScope {
        AuthScope::enter(self.auth_mode, self.profile.as_deref())
    }

    /// Generates a starter specification for a job.
    ///
    /// With a destination path the template is written there (refusing an
    /// existing file unless `overwrite`) and `None` is returned; without one
    /// the rendered text is returned.
    pub async fn init(
        &self,
        destination: Option<&Path>,
        overwrite: bool,
        runtime_type: Option<&str>,
    ) -> Result<Option<String>> {
        let _scope = self.auth_scope();

        let kind = match runtime_type {
            Some(key) => RuntimeKind::from_key(key)?,
            None => RuntimeKind::default(),
        };

        let text = template::render(&self.config.infrastructure, kind)?;

        match destination {
            Some(path) => {
                template::write(path, &text, overwrite).await?;
                tracing::info!(path = %path.display(), "wrote job template");
                Ok(None)
            }
            None => Ok(Some(text)),
        }
    }

    /// Creates a job and run from an existing specification file.
    pub async fn apply(&self) -> Result<()> {
        Err(BackendError::Unsupported(
            "`apply` is not available for the dataflow backend yet".into(),
        ))
    }

    /// Creates a job (unless an existing one is referenced) and submits a run.
    ///
    /// With `execution.ocid` set, the existing job is looked up and a run is
    /// submitted directly; the infrastructure section is never inspected.
    /// Otherwise all required infrastructure fields are validated up front and
    /// the job is created from configuration. A job that was created but whose
    /// run submission failed is left in place; there is no rollback.
    pub async fn run(&self) -> Result<RunSubmission> {
        let _scope = self.auth_scope();
        let execution = &self.config.execution;

        let (job_id, run_id) = if let Some(ocid) = execution.ocid.as_deref() {
            let job = self.provider.get_job(ocid).await?;
            let run = self.provider.submit_run(&job.id).await?;
            (job.id, run.id)
        } else {
            let missing = self.config.infrastructure.missing_fields();
            if !missing.is_empty() {
                return Err(BackendError::Validation(format!(
                    "The following infrastructure fields are missing but required for dataflow jobs: {}. Set them in the `infrastructure` section of the job configuration.",
                    missing.join(", ")
                )));
            }

            let runtime = RuntimeSpec::from_config(execution, &self.config.infrastructure)?;
            let infrastructure = InfrastructureSpec::from_config(&self.config.infrastructure)?;
            let spec = JobSpec {
                name: job_name(execution),
                infrastructure,
                runtime,
            };

            tracing::info!(name = %spec.name, "creating dataflow job");
            let job = self.provider.create_job(&spec, execution.overwrite).await?;
            let run = self.provider.submit_run(&job.id).await?;
            (job.id, run.id)
        };

        println!("Job ID: {job_id}");
        println!("Run ID: {run_id}");

        Ok(RunSubmission { job_id, run_id })
    }

    /// Cancels the run referenced by `execution.run_id`.
    pub async fn cancel(&self) -> Result<()> {
        let run_id = self.config.execution.run_id.as_deref().ok_or_else(|| {
            BackendError::Validation(
                "Can only cancel a dataflow run, set `execution.run_id`.".into(),
            )
        })?;

        let _scope = self.auth_scope();
        let run = self.provider.get_run(run_id).await?;
        self.provider.delete_run(&run.id).await?;
        tracing::info!(run_id, "canceled dataflow run");
        Ok(())
    }

    /// Deletes the job referenced by `execution.id`, or failing that the run
    /// referenced by `execution.run_id`. With neither set this is a no-op.
    pub async fn delete(&self) -> Result<()> {
        if let Some(id) = self.config.execution.id.as_deref() {
            let _scope = self.auth_scope();
            let job = self.provider.get_job(id).await?;
            // Runs of the job are removed by the provider.
            self.provider.delete_job(&job.id).await?;
            tracing::info!(id, "deleted dataflow job");
        } else if let Some(run_id) = self.config.execution.run_id.as_deref() {
            let _scope = self.auth_scope();
            let run = self.provider.get_run(run_id).await?;
            self.provider.delete_run(&run.id).await?;
            tracing::info!(run_id, "deleted dataflow run");
        }

        Ok(())
    }

    /// Streams the logs of the run referenced by `execution.run_id` to the
    /// terminal until the run reaches a terminal state.
    ///
    /// Cancellation is cooperative: dropping the returned future (e.g. on
    /// ctrl-c) stops the watch at the next poll.
    pub async fn watch(&self) -> Result<()> {
        let run_id = self.config.execution.run_id.as_deref().ok_or_else(|| {
            BackendError::Validation(
                "Can only watch a dataflow run, set `execution.run_id`.".into(),
            )
        })?;

        let _scope = self.auth_scope();
        let mut stream = self.provider.watch_run(run_id).await?;

        while let Some(record) = stream.next().await {
            let record = record?;
            let prefix = match &record.timestamp {
                Some(ts) => format!("[{ts}] "),
                None => String::new(),
            };

            match record.source {
                LogSource::Stdout => {
                    print!("{}{}", prefix, record.message);
                    let _ = std::io::stdout().flush();
                }
                LogSource::Stderr => {
                    eprint!("{}{}", prefix, record.message);
                    let _ = std::io::stderr().flush();
                }
                LogSource::Console => {
                    println!("\x1b[90m{}{}\x1b[0m", prefix, record.message);
                }
            }
        }

        Ok(())
    }
}

/// Jobs created from configuration are named after their entrypoint.
fn job_name(execution: &ExecutionConfig) -> String {
    execution
        .entrypoint
        .clone()
        .unwrap_or_else(|| "dataflow-job".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltaflow_mock::MockProvider;

    fn full_config() -> JobConfig {
        JobConfig {
            execution: ExecutionConfig {
                source_folder: Some("/a".into()),
                entrypoint: Some("job.py".into()),
                command: Some("--x 1".into()),
                ..Default::default()
            },
            infrastructure: InfrastructureConfig {
                compartment_id: Some("c1".into()),
                driver_shape: Some("d".into()),
                executor_shape: Some("e".into()),
                logs_bucket_uri: Some("b".into()),
                script_bucket: Some("sb".into()),
                ..Default::default()
            },
        }
    }

    fn backend(config: JobConfig) -> (DataflowBackend<MockProvider>, MockProvider) {
        let provider = MockProvider::default();
        let backend = DataflowBackend::new(config, provider.clone()).unwrap();
        (backend, provider)
    }

    #[test]
    fn new_rejects_unknown_auth_mode() {
        let mut config = full_config();
        config.execution.auth = Some("kerberos".into());

        let err = DataflowBackend::new(config, MockProvider::default()).unwrap_err();
        assert!(matches!(err, BackendError::Auth(AuthError::UnknownMode(_))));
    }

    #[tokio::test]
    async fn run_creates_job_and_submits_run() {
        let (backend, provider) = backend(full_config());

        let submission = backend.run().await.unwrap();

        assert!(provider.job_exists(&submission.job_id));
        assert!(provider.run_exists(&submission.run_id));
        assert_eq!(
            provider.calls(),
            vec![
                "create_job".to_string(),
                format!("submit_run {}", submission.job_id),
            ]
        );
    }

    #[tokio::test]
    async fn run_lists_every_missing_field_and_makes_no_calls() {
        let mut config = full_config();
        config.infrastructure.compartment_id = None;
        config.infrastructure.script_bucket = None;
        let (backend, provider) = backend(config);

        let err = backend.run().await.unwrap_err();

        match err {
            BackendError::Validation(msg) => {
                assert!(msg.contains("compartment_id, script_bucket"), "{msg}");
                assert!(!msg.contains("driver_shape"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn run_with_ocid_skips_infrastructure_entirely() {
        // Deliberately broken infrastructure: the ocid path must not look at it.
        let config = JobConfig {
            execution: ExecutionConfig {
                ocid: Some("ocid1.job.1".into()),
                ..Default::default()
            },
            infrastructure: InfrastructureConfig::default(),
        };
        let (backend, provider) = backend(config);
        provider.seed_job("ocid1.job.1", JobSpec::default());

        let submission = backend.run().await.unwrap();

        assert_eq!(submission.job_id, "ocid1.job.1");
        assert_eq!(
            provider.calls(),
            vec![
                "get_job ocid1.job.1".to_string(),
                "submit_run ocid1.job.1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn run_propagates_provider_errors_unmodified() {
        let config = JobConfig {
            execution: ExecutionConfig {
                ocid: Some("ocid1.job.missing".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let (backend, _provider) = backend(config);

        let err = backend.run().await.unwrap_err();
        assert!(matches!(err, BackendError::Provider(ProviderError::NotFound(_))));
    }

    #[tokio::test]
    async fn apply_is_unsupported() {
        let (backend, _) = backend(full_config());
        let err = backend.apply().await.unwrap_err();
        assert!(matches!(err, BackendError::Unsupported(_)));
    }

    #[tokio::test]
    async fn cancel_requires_run_id() {
        let (backend, provider) = backend(full_config());

        let err = backend.cancel().await.unwrap_err();

        assert!(matches!(err, BackendError::Validation(_)));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn cancel_deletes_the_run() {
        let mut config = full_config();
        config.execution.run_id = Some("run-7".into());
        let (backend, provider) = backend(config);
        provider.seed_job("job-1", JobSpec::default());
        provider.seed_run("run-7", "job-1", RunState::InProgress);

        backend.cancel().await.unwrap();

        assert!(!provider.run_exists("run-7"));
        assert_eq!(
            provider.calls(),
            vec!["get_run run-7".to_string(), "delete_run run-7".to_string()]
        );
    }

    #[tokio::test]
    async fn watch_requires_run_id() {
        let (backend, provider) = backend(full_config());

        let err = backend.watch().await.unwrap_err();

        assert!(matches!(err, BackendError::Validation(_)));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn watch_consumes_the_log_stream() {
        let mut config = full_config();
        config.execution.run_id = Some("run-1".into());
        let (backend, provider) = backend(config);
        provider.seed_job("job-1", JobSpec::default());
        provider.seed_run("run-1", "job-1", RunState::Succeeded);
        provider.push_log("run-1", "done\n");

        backend.watch().await.unwrap();
        assert_eq!(provider.calls(), vec!["watch_run run-1".to_string()]);
    }

    #[tokio::test]
    async fn delete_without_ids_is_a_noop() {
        let (backend, provider) = backend(full_config());

        backend.delete().await.unwrap();
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn delete_prefers_the_job_id() {
        let mut config = full_config();
        config.execution.id = Some("job-1".into());
        config.execution.run_id = Some("run-1".into());
        let (backend, provider) = backend(config);
        provider.seed_job("job-1", JobSpec::default());
        provider.seed_run("run-1", "job-1", RunState::Succeeded);

        backend.delete().await.unwrap();

        assert!(!provider.job_exists("job-1"));
        // Cascaded, not deleted directly.
        assert!(!provider.run_exists("run-1"));
        assert_eq!(
            provider.calls(),
            vec!["get_job job-1".to_string(), "delete_job job-1".to_string()]
        );
    }

    #[tokio::test]
    async fn delete_falls_back_to_the_run_id() {
        let mut config = full_config();
        config.execution.run_id = Some("run-1".into());
        let (backend, provider) = backend(config);
        provider.seed_job("job-1", JobSpec::default());
        provider.seed_run("run-1", "job-1", RunState::Succeeded);

        backend.delete().await.unwrap();

        assert!(!provider.run_exists("run-1"));
        assert_eq!(
            provider.calls(),
            vec!["get_run run-1".to_string(), "delete_run run-1".to_string()]
        );
    }

    #[tokio::test]
    async fn init_returns_text_without_destination() {
        let (backend, _) = backend(full_config());

        let text = backend.init(None, false, None).await.unwrap().unwrap();

        assert!(text.starts_with("# This specification was auto generated"));
        assert!(text.contains("compartmentId: c1"));
    }

    #[tokio::test]
    async fn init_rejects_unknown_runtime_type() {
        let (backend, _) = backend(full_config());

        let err = backend.init(None, false, Some("container")).await.unwrap_err();
        assert!(matches!(err, BackendError::Validation(_)));
    }

    #[tokio::test]
    async fn init_respects_overwrite() {
        let (backend, _) = backend(full_config());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.yaml");
        std::fs::write(&path, "keep me").unwrap();

        let err = backend.init(Some(&path), false, None).await.unwrap_err();
        assert!(matches!(err, BackendError::AlreadyExists(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");

        let written = backend.init(Some(&path), true, None).await.unwrap();
        assert!(written.is_none());
        assert!(
            std::fs::read_to_string(&path)
                .unwrap()
                .starts_with("# This specification")
        );
    }
}
