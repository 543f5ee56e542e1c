//! Auth signer resolution.
//!
//! The signature cryptography itself lives in the transport layer of the
//! remote service contract; this module resolves *which* credentials a
//! request carries. Api-key auth reads a profile section from a local config
//! file, the principal modes pick up a session token from the environment.

use deltaflow_core::auth::AuthMode;
use deltaflow_core::error::AuthError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_PROFILE: &str = "DEFAULT";
const SESSION_TOKEN_VAR: &str = "DELTAFLOW_SESSION_TOKEN";

/// Resolved request credentials.
///
/// Construction validates everything up front so adapter construction fails
/// fast on bad auth parameters.
#[derive(Debug, Clone)]
pub struct Signer {
    mode: AuthMode,
    key_id: Option<String>,
    session_token: Option<String>,
}

impl Signer {
    pub fn new(
        mode: AuthMode,
        config: Option<&Path>,
        profile: Option<&str>,
    ) -> Result<Self, AuthError> {
        match mode {
            AuthMode::ApiKey => {
                let path = config
                    .map(Path::to_path_buf)
                    .unwrap_or_else(default_config_path);
                let text = std::fs::read_to_string(&path).map_err(|source| {
                    AuthError::ConfigUnreadable {
                        path: path.display().to_string(),
                        source,
                    }
                })?;

                let name = profile.unwrap_or(DEFAULT_PROFILE);
                let entries = parse_profile(&text, name)
                    .ok_or_else(|| AuthError::ProfileNotFound(name.to_string()))?;

                let tenancy = require(&entries, "tenancy")?;
                let user = require(&entries, "user")?;
                let fingerprint = require(&entries, "fingerprint")?;
                require(&entries, "key_file")?;

                Ok(Self {
                    mode,
                    key_id: Some(format!("{tenancy}/{user}/{fingerprint}")),
                    session_token: None,
                })
            }
            AuthMode::ResourcePrincipal | AuthMode::InstancePrincipal => {
                let token = std::env::var(SESSION_TOKEN_VAR)
                    .map_err(|_| AuthError::MissingEntry(SESSION_TOKEN_VAR))?;

                Ok(Self {
                    mode,
                    key_id: None,
                    session_token: Some(token),
                })
            }
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// The `Authorization` header value for one request.
    pub fn auth_header(&self) -> String {
        match self.mode {
            AuthMode::ApiKey => format!(
                "Signature keyId=\"{}\"",
                self.key_id.as_deref().unwrap_or_default()
            ),
            AuthMode::ResourcePrincipal | AuthMode::InstancePrincipal => format!(
                "Bearer {}",
                self.session_token.as_deref().unwrap_or_default()
            ),
        }
    }
}

#[cfg(test)]
impl Signer {
    pub(crate) fn test_signer() -> Self {
        Self {
            mode: AuthMode::ApiKey,
            key_id: Some("tenancy/user/fingerprint".into()),
            session_token: None,
        }
    }
}

fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".deltaflow")
        .join("config")
}

fn require<'a>(
    entries: &'a BTreeMap<String, String>,
    key: &'static str,
) -> Result<&'a str, AuthError> {
    entries
        .get(key)
        .map(String::as_str)
        .ok_or(AuthError::MissingEntry(key))
}

/// Extracts one `[section]` of an INI-style config file.
fn parse_profile(text: &str, name: &str) -> Option<BTreeMap<String, String>> {
    let mut entries = BTreeMap::new();
    let mut in_section = false;
    let mut found = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = section.trim() == name;
            found |= in_section;
            continue;
        }

        if in_section {
            if let Some((key, value)) = line.split_once('=') {
                entries.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    if found { Some(entries) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = "\
[DEFAULT]
user=ocid1.user.1
fingerprint=aa:bb
tenancy=ocid1.tenancy.1
key_file=~/.deltaflow/key.pem

[ci]
user=ocid1.user.2
fingerprint=cc:dd
tenancy=ocid1.tenancy.1
key_file=/etc/deltaflow/key.pem
";

    fn config_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();
        file
    }

    #[test]
    fn api_key_reads_the_default_profile() {
        let file = config_file();
        let signer = Signer::new(AuthMode::ApiKey, Some(file.path()), None).unwrap();

        assert_eq!(
            signer.auth_header(),
            "Signature keyId=\"ocid1.tenancy.1/ocid1.user.1/aa:bb\""
        );
    }

    #[test]
    fn api_key_reads_a_named_profile() {
        let file = config_file();
        let signer = Signer::new(AuthMode::ApiKey, Some(file.path()), Some("ci")).unwrap();

        assert_eq!(
            signer.auth_header(),
            "Signature keyId=\"ocid1.tenancy.1/ocid1.user.2/cc:dd\""
        );
    }

    #[test]
    fn missing_profile_is_an_auth_error() {
        let file = config_file();
        let err = Signer::new(AuthMode::ApiKey, Some(file.path()), Some("prod")).unwrap_err();
        assert!(matches!(err, AuthError::ProfileNotFound(p) if p == "prod"));
    }

    #[test]
    fn missing_file_is_an_auth_error() {
        let err = Signer::new(
            AuthMode::ApiKey,
            Some(Path::new("/nonexistent/deltaflow/config")),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::ConfigUnreadable { .. }));
    }

    #[test]
    fn incomplete_profile_is_an_auth_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[DEFAULT]\nuser=ocid1.user.1\n").unwrap();

        let err = Signer::new(AuthMode::ApiKey, Some(file.path()), None).unwrap_err();
        assert!(matches!(err, AuthError::MissingEntry(_)));
    }
}
