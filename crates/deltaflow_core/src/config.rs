use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Infrastructure fields that must be present before a job can be created
/// from configuration alone (i.e. without an existing job OCID).
pub const REQUIRED_FIELDS: [&str; 5] = [
    "compartment_id",
    "driver_shape",
    "executor_shape",
    "logs_bucket_uri",
    "script_bucket",
];

/// The local job configuration consumed by the backend adapter.
///
/// Owned by the caller and immutable for the adapter's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobConfig {
    pub execution: ExecutionConfig,
    pub infrastructure: InfrastructureConfig,
}

/// How and what to execute: auth parameters, resource ids for operations on
/// existing jobs/runs, and the submission payload fields.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Auth mode key, see [`AuthMode`](crate::auth::AuthMode). Defaults to api-key auth.
    pub auth: Option<String>,
    /// Path to the api-key config file.
    pub auth_config: Option<PathBuf>,
    /// Profile section inside the api-key config file.
    pub auth_profile: Option<String>,
    /// Service endpoint override.
    pub endpoint: Option<String>,
    /// OCID of an existing job to submit a run against.
    pub ocid: Option<String>,
    /// OCID of an existing job, for `delete`.
    pub id: Option<String>,
    /// OCID of an existing run, for `cancel`/`delete`/`watch`.
    pub run_id: Option<String>,
    /// Local or object-storage folder holding the entrypoint.
    pub source_folder: Option<String>,
    /// Script file executed by the job, relative to `source_folder`.
    pub entrypoint: Option<String>,
    /// Command line passed to the entrypoint, split shell-style into argv.
    pub command: Option<String>,
    /// Archive (e.g. a dependency bundle) uploaded alongside the script.
    pub archive: Option<String>,
    /// Bucket the archive is staged in.
    pub archive_bucket: Option<String>,
    /// Replace an existing job with the same name on create.
    pub overwrite: bool,
}

/// Compute shape and bucket/location parameters for a job.
///
/// Attributes the adapter does not model explicitly (e.g. `spark_version`,
/// `num_executors`) are carried through `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InfrastructureConfig {
    pub compartment_id: Option<String>,
    pub driver_shape: Option<String>,
    pub executor_shape: Option<String>,
    pub logs_bucket_uri: Option<String>,
    pub script_bucket: Option<String>,
    /// Provider-side configuration overrides, as a JSON object string.
    pub configuration: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl InfrastructureConfig {
    /// Returns every required field that is absent, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.compartment_id.is_some(),
            self.driver_shape.is_some(),
            self.executor_shape.is_some(),
            self.logs_bucket_uri.is_some(),
            self.script_bucket.is_some(),
        ];

        REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter_map(|(name, ok)| if ok { None } else { Some(*name) })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_every_absent_field() {
        let infra = InfrastructureConfig {
            driver_shape: Some("standard.2".into()),
            logs_bucket_uri: Some("st://logs".into()),
            ..Default::default()
        };

        assert_eq!(
            infra.missing_fields(),
            vec!["compartment_id", "executor_shape", "script_bucket"]
        );
    }

    #[test]
    fn missing_fields_empty_when_complete() {
        let infra = InfrastructureConfig {
            compartment_id: Some("c1".into()),
            driver_shape: Some("d".into()),
            executor_shape: Some("e".into()),
            logs_bucket_uri: Some("b".into()),
            script_bucket: Some("sb".into()),
            ..Default::default()
        };

        assert!(infra.missing_fields().is_empty());
    }

    #[test]
    fn parses_yaml_with_extra_infrastructure_attributes() {
        let yaml = r#"
execution:
  entrypoint: job.py
  source_folder: /work
infrastructure:
  compartment_id: c1
  driver_shape: standard.2
  spark_version: "3.5"
"#;
        let config: JobConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.execution.entrypoint.as_deref(), Some("job.py"));
        assert!(!config.execution.overwrite);
        assert_eq!(
            config.infrastructure.extra.get("spark_version"),
            Some(&serde_json::json!("3.5"))
        );
    }
}
