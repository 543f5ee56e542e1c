use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The configured auth mode key is not one of the supported modes.
    #[error("Unknown auth mode '{0}'")]
    UnknownMode(String),

    /// The api-key configuration file could not be read.
    #[error("Cannot read auth config '{path}': {source}")]
    ConfigUnreadable {
        path: String,
        source: std::io::Error,
    },

    /// The requested profile section is absent from the auth config file.
    #[error("Profile '{0}' not found in auth config")]
    ProfileNotFound(String),

    /// A profile or ambient environment is missing a required entry.
    #[error("Missing required auth entry '{0}'")]
    MissingEntry(&'static str),
}

/// Failures surfaced from the remote service, passed through to the caller
/// unmodified.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The referenced job or run does not exist on the remote side.
    #[error("Resource {0} not found")]
    NotFound(String),

    /// The service rejected the request.
    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// A response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The adapter's error taxonomy.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The auth signer could not be constructed from the supplied parameters.
    #[error("Authentication failure: {0}")]
    Auth(#[from] AuthError),

    /// The configuration is missing or malformed in a way detected before
    /// any provider call is made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A template destination exists and overwrite was not requested.
    #[error("'{0}' already exists, pass overwrite to replace it")]
    AlreadyExists(String),

    /// The operation is not available for this backend.
    #[error("Feature not supported: {0}")]
    Unsupported(String),

    /// Remote failure, surfaced as-is.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Local filesystem failure while reading or writing templates.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Template or configuration (de)serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
