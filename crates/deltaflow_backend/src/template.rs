//! Starter template generation for `init`.

use crate::runtime_factory::RuntimeKind;
use crate::Result;
use deltaflow_core::prelude::*;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tokio::fs;

const NOTE: &str = "\
# This specification was auto generated by the `deltaflow init` command.
# The full job specification schema is documented at:
# https://deltaflow-rs.github.io/deltaflow/jobs.html

";

/// Renders a starter job specification.
///
/// Infrastructure values present in the configuration are carried over;
/// everything else is emitted as a `{...}` placeholder. The runtime section
/// contains only the attributes meaningful for `kind`.
pub fn render(infrastructure: &InfrastructureConfig, kind: RuntimeKind) -> Result<String> {
    let mut spec = Mapping::new();
    spec.insert(
        "name".into(),
        "{Job name. Replaced by integrations with the project name}".into(),
    );
    spec.insert(
        "infrastructure".into(),
        Value::Mapping(infrastructure_template(infrastructure)?),
    );
    spec.insert("runtime".into(), Value::Mapping(kind.template()));

    let mut root = Mapping::new();
    root.insert("kind".into(), "job".into());
    root.insert("spec".into(), Value::Mapping(spec));

    let body = serde_yaml::to_string(&Value::Mapping(root))?;
    Ok(format!("{NOTE}{body}"))
}

fn infrastructure_template(infrastructure: &InfrastructureConfig) -> Result<Mapping> {
    let mut section = Mapping::new();

    let fields = [
        (
            "compartmentId",
            &infrastructure.compartment_id,
            "{Compartment OCID the job is created in}",
        ),
        (
            "driverShape",
            &infrastructure.driver_shape,
            "{Compute shape of the driver node}",
        ),
        (
            "executorShape",
            &infrastructure.executor_shape,
            "{Compute shape of the executor nodes}",
        ),
        (
            "logsBucketUri",
            &infrastructure.logs_bucket_uri,
            "{Object storage bucket the service writes logs to}",
        ),
    ];

    for (attribute, value, placeholder) in fields {
        let rendered = value.clone().unwrap_or_else(|| placeholder.to_string());
        section.insert(attribute.into(), rendered.into());
    }

    for (attribute, value) in &infrastructure.extra {
        section.insert(attribute.as_str().into(), serde_yaml::to_value(value)?);
    }

    Ok(section)
}

/// Writes a rendered template to `path`.
///
/// Refuses to touch an existing file unless `overwrite` is set.
pub async fn write(path: &Path, text: &str, overwrite: bool) -> Result<()> {
    if fs::try_exists(path).await? && !overwrite {
        return Err(BackendError::AlreadyExists(path.display().to_string()));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(path, text).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_carries_configured_values_and_placeholders() {
        let infrastructure = InfrastructureConfig {
            compartment_id: Some("c1".into()),
            ..Default::default()
        };

        let text = render(&infrastructure, RuntimeKind::Dataflow).unwrap();

        assert!(text.starts_with("# This specification was auto generated"));
        assert!(text.contains("compartmentId: c1"));
        assert!(text.contains("driverShape: '{Compute shape of the driver node}'"));
        assert!(text.contains("type: dataFlow"));
    }

    #[test]
    fn render_passes_extra_attributes_through() {
        let mut infrastructure = InfrastructureConfig::default();
        infrastructure
            .extra
            .insert("sparkVersion".into(), serde_json::json!("3.5"));

        let text = render(&infrastructure, RuntimeKind::Dataflow).unwrap();
        assert!(text.contains("sparkVersion: '3.5'"));
    }

    #[tokio::test]
    async fn write_respects_overwrite_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.yaml");

        write(&path, "first", false).await.unwrap();
        let err = write(&path, "second", false).await.unwrap_err();
        assert!(matches!(err, BackendError::AlreadyExists(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");

        write(&path, "second", true).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
