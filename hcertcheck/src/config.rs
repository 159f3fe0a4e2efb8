use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::ConfigError,
    utils::{verification_url, VERIFY_PATH},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    pub base_url: String,
    #[serde(default = "default_verify_endpoint")]
    pub verify_endpoint: String,
    /// Whole-request timeout; the HTTP client default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_verify_endpoint() -> String {
    VERIFY_PATH.to_string()
}

impl VerifierConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            verify_endpoint: default_verify_endpoint(),
            timeout_secs: None,
        }
    }

    pub fn with_verify_endpoint(mut self, verify_endpoint: impl Into<String>) -> Self {
        self.verify_endpoint = verify_endpoint.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn verify_url(&self) -> Result<Url, ConfigError> {
        verification_url(&self.base_url, &self.verify_endpoint)
    }
}
