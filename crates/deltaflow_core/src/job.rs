use crate::config::{ExecutionConfig, InfrastructureConfig};
use crate::error::BackendError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Submission-time parameters for a job, distinct from its infrastructure.
///
/// Built fresh per `run` invocation from the configuration; wire names match
/// the service contract.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSpec {
    #[serde(rename = "scriptPathURI", skip_serializing_if = "Option::is_none")]
    pub script_path_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_bucket: Option<String>,
}

impl RuntimeSpec {
    /// Builds the runtime descriptor for a submission.
    ///
    /// The script path is the join of `source_folder` and `entrypoint`; the
    /// script bucket comes from the infrastructure section; the command line
    /// is split shell-style; archive fields are set only when an archive is
    /// configured. The configuration itself is left untouched.
    pub fn from_config(
        execution: &ExecutionConfig,
        infrastructure: &InfrastructureConfig,
    ) -> Result<Self, BackendError> {
        let source_folder = execution
            .source_folder
            .as_deref()
            .ok_or_else(|| missing("execution.source_folder"))?;
        let entrypoint = execution
            .entrypoint
            .as_deref()
            .ok_or_else(|| missing("execution.entrypoint"))?;

        let args = match execution.command.as_deref() {
            Some(command) => shlex::split(command).ok_or_else(|| {
                BackendError::Validation(format!("Cannot split command '{command}' into arguments"))
            })?,
            None => Vec::new(),
        };

        let (archive_uri, archive_bucket) = match execution.archive.clone() {
            Some(uri) => (Some(uri), execution.archive_bucket.clone()),
            None => (None, None),
        };

        Ok(Self {
            script_path_uri: Some(join_path(source_folder, entrypoint)),
            script_bucket: infrastructure.script_bucket.clone(),
            args,
            archive_uri,
            archive_bucket,
        })
    }
}

/// Joins a folder and a file name with a single separator.
///
/// The folder may be a local path or an object storage URI, so this is a
/// plain string join rather than a platform path operation.
fn join_path(folder: &str, file: &str) -> String {
    format!("{}/{}", folder.trim_end_matches('/'), file)
}

fn missing(field: &str) -> BackendError {
    BackendError::Validation(format!("'{field}' is required to submit a run"))
}

/// Compute shape and location parameters sent to the service when creating
/// a job.
///
/// Buckets that belong to the runtime (`script_bucket`, `archive_bucket`)
/// are deliberately not part of this descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compartment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor_shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs_bucket_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl InfrastructureSpec {
    /// Builds the infrastructure descriptor from an immutable configuration
    /// view. A malformed `configuration` JSON string is a validation error.
    pub fn from_config(infrastructure: &InfrastructureConfig) -> Result<Self, BackendError> {
        let configuration = infrastructure
            .configuration
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| {
                BackendError::Validation(format!(
                    "'infrastructure.configuration' is not valid JSON: {e}"
                ))
            })?;

        Ok(Self {
            compartment_id: infrastructure.compartment_id.clone(),
            driver_shape: infrastructure.driver_shape.clone(),
            executor_shape: infrastructure.executor_shape.clone(),
            logs_bucket_uri: infrastructure.logs_bucket_uri.clone(),
            configuration,
            extra: infrastructure.extra.clone(),
        })
    }
}

/// The resource description submitted to the remote service.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct JobSpec {
    pub name: String,
    pub infrastructure: InfrastructureSpec,
    pub runtime: RuntimeSpec,
}

/// A job that exists remotely, identified by an opaque OCID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub spec: JobSpec,
}

/// One execution of a [`Job`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub job_id: String,
    pub state: RunState,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Accepted,
    InProgress,
    Canceling,
    Canceled,
    Succeeded,
    Failed,
    Stopped,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Canceled | Self::Succeeded | Self::Failed | Self::Stopped)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogSource {
    Stdout,
    Stderr,
    Console,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogOutput {
    pub source: LogSource,
    /// RFC3339 timestamp string, e.g., "2026-01-01T01:00:00Z".
    pub timestamp: Option<String>,
    pub message: String,
}
