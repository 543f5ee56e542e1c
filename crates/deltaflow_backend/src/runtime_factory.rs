use crate::Result;
use deltaflow_core::prelude::*;
use serde_yaml::Mapping;

/// The closed set of runtime shapes a job template can be generated for.
///
/// A key→constructor map in disguise: only two variants exist, so this is an
/// enum dispatch rather than an open registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeKind {
    /// A plain script runtime.
    #[default]
    Dataflow,
    /// A notebook runtime, converted to a script on the provider side.
    Notebook,
}

impl RuntimeKind {
    /// Resolves a runtime-type key to its kind.
    pub fn from_key(key: &str) -> Result<Self> {
        match key {
            "dataFlow" => Ok(Self::Dataflow),
            "dataFlowNotebook" => Ok(Self::Notebook),
            other => Err(BackendError::Validation(format!(
                "unsupported runtime type '{other}', expected 'dataFlow' or 'dataFlowNotebook'"
            ))),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Dataflow => "dataFlow",
            Self::Notebook => "dataFlowNotebook",
        }
    }

    /// Attributes meaningful for this runtime; templates emit nothing else.
    pub fn attributes(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Dataflow => &[
                ("scriptPathURI", "{Path to the executable script. Local or object storage path}"),
                ("scriptBucket", "{Object storage bucket to upload the script to}"),
            ],
            Self::Notebook => &[
                ("notebookPathURI", "{Path to the notebook. Local or object storage path}"),
                ("scriptBucket", "{Object storage bucket to upload the converted script to}"),
                ("outputURI", "{Object storage path the executed notebook is written to}"),
            ],
        }
    }

    /// The runtime section of a generated template.
    pub fn template(&self) -> Mapping {
        let mut runtime = Mapping::new();
        runtime.insert("type".into(), self.key().into());
        for (attribute, placeholder) in self.attributes() {
            runtime.insert((*attribute).into(), (*placeholder).into());
        }
        runtime
    }
}
