//! Error types surfaced by the verification client.

use std::fmt;

use serde_json::Value;

use crate::response::{ErrorState, InvalidState};

/// The verification endpoint could not be reached, answered with something
/// other than HTTP 200, or sent a body that does not decode into a
/// [`VerificationResponse`](crate::response::VerificationResponse).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("verification response couldn't be parsed")]
pub struct ResponseParseError {
    diagnostic: Option<Value>,
}

impl ResponseParseError {
    pub fn new(diagnostic: Option<Value>) -> Self {
        Self { diagnostic }
    }

    pub fn empty() -> Self {
        Self { diagnostic: None }
    }

    /// Best-effort JSON tree of the response body, present only when the
    /// body was valid JSON of the wrong shape.
    pub fn diagnostic(&self) -> Option<&Value> {
        self.diagnostic.as_ref()
    }

    pub fn into_diagnostic(self) -> Option<Value> {
        self.diagnostic
    }
}

/// What the verification service reported for a certificate it did not
/// accept.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Error(ErrorState),
    Invalid(InvalidState),
    /// Neither an error nor an invalid state was present.
    Unspecified,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Error(state) => write!(f, "error state {}", state),
            Rejection::Invalid(state) => write!(f, "invalid state {}", state),
            Rejection::Unspecified => write!(f, "no state reported"),
        }
    }
}

/// The service understood the request and rejected the certificate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("certificate rejected: {rejection}")]
pub struct ValidationError {
    rejection: Rejection,
}

impl ValidationError {
    pub fn new(rejection: Rejection) -> Self {
        Self { rejection }
    }

    pub fn rejection(&self) -> &Rejection {
        &self.rejection
    }

    pub fn into_rejection(self) -> Rejection {
        self.rejection
    }
}

/// Error returned by [`VerificationClient::validate`](crate::client::VerificationClient::validate).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    ResponseParse(#[from] ResponseParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type VerifyResult<T> = Result<T, VerifyError>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid verification url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported url scheme {scheme:?}, expected http or https")]
    UnsupportedScheme { scheme: String },

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_display_names_the_state() {
        let rejection = Rejection::Error(ErrorState::Code("EXPIRED".to_string()));
        assert_eq!(rejection.to_string(), "error state EXPIRED");

        let err = ValidationError::new(rejection);
        assert_eq!(err.to_string(), "certificate rejected: error state EXPIRED");

        assert_eq!(Rejection::Unspecified.to_string(), "no state reported");
    }

    #[test]
    fn verify_error_is_transparent() {
        let err: VerifyError = ResponseParseError::empty().into();
        assert_eq!(err.to_string(), "verification response couldn't be parsed");
        assert!(matches!(err, VerifyError::ResponseParse(ref e) if e.diagnostic().is_none()));
    }
}
