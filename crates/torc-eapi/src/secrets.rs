// Device credentials, loaded from a YAML secrets file.
//
// The file is re-read on every connect/refresh so that rotated
// credentials take effect on the next refresh without a restart.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::Error;

/// Credentials for one device, as stored in the secrets file:
///
/// ```yaml
/// credentials:
///   username: admin
///   password: hunter2
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct EapiSecrets {
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl EapiSecrets {
    /// Load and parse the secrets file at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Credentials {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&raw).map_err(|e| Error::Credentials {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
