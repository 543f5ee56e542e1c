use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How credentials for the remote service are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// An api-key profile read from a local config file.
    #[default]
    ApiKey,
    /// Credentials minted for the workload by the platform.
    ResourcePrincipal,
    /// Credentials derived from the instance the caller runs on.
    InstancePrincipal,
}

impl AuthMode {
    pub fn key(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::ResourcePrincipal => "resource_principal",
            Self::InstancePrincipal => "instance_principal",
        }
    }
}

impl FromStr for AuthMode {
    type Err = AuthError;

    fn from_str(key: &str) -> Result<Self, AuthError> {
        match key {
            "api_key" => Ok(Self::ApiKey),
            "resource_principal" => Ok(Self::ResourcePrincipal),
            "instance_principal" => Ok(Self::InstancePrincipal),
            other => Err(AuthError::UnknownMode(other.to_string())),
        }
    }
}

/// Scoped authentication context for one adapter operation.
///
/// Entered at the start of every operation that touches the provider and
/// released on every exit path via [`Drop`], so all provider calls within
/// one operation observe the same auth mode and profile. Not reentrant-safe
/// across threads sharing one adapter.
#[must_use = "the auth scope is released as soon as the guard is dropped"]
pub struct AuthScope {
    mode: AuthMode,
    profile: Option<String>,
}

impl AuthScope {
    pub fn enter(mode: AuthMode, profile: Option<&str>) -> Self {
        tracing::debug!(mode = mode.key(), profile, "entering auth scope");
        Self {
            mode,
            profile: profile.map(str::to_string),
        }
    }
}

impl Drop for AuthScope {
    fn drop(&mut self) {
        tracing::debug!(
            mode = self.mode.key(),
            profile = self.profile.as_deref(),
            "leaving auth scope"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes() {
        assert_eq!("api_key".parse::<AuthMode>().unwrap(), AuthMode::ApiKey);
        assert_eq!(
            "resource_principal".parse::<AuthMode>().unwrap(),
            AuthMode::ResourcePrincipal
        );
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = "kerberos".parse::<AuthMode>().unwrap_err();
        assert!(matches!(err, AuthError::UnknownMode(k) if k == "kerberos"));
    }
}
