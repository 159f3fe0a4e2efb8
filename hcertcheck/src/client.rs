use crate::{
    codec::JsonCodec,
    config::VerifierConfig,
    error::{ConfigError, ResponseParseError, ValidationError, VerifyResult},
    response::VerificationResponse,
    transport::{HttpRequest, ReqwestTransport, Transport},
    utils::{json_headers, verification_url},
};
use log::{debug, error, info};
use reqwest::StatusCode;
use serde::Serialize;
use std::{fmt, sync::Arc};
use url::Url;

/// Why a call produced no response to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentReason {
    /// The payload couldn't be serialized.
    Encode,
    /// The transport failed before a reply arrived.
    Transport,
    /// The service answered with something other than HTTP 200.
    Status(StatusCode),
    /// HTTP 200 with a JSON `null` body.
    NullBody,
}

/// Unclassified result of a single verification call.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    Response(VerificationResponse),
    Absent(AbsentReason),
    Unparseable(ResponseParseError),
}

/// Client for the remote certificate verification endpoint.
///
/// Cloning is cheap; clones share the transport and codec.
#[derive(Clone)]
pub struct VerificationClient {
    verify_url: Url,
    transport: Arc<dyn Transport>,
    codec: JsonCodec,
}

impl fmt::Debug for VerificationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationClient")
            .field("verify_url", &self.verify_url.as_str())
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl VerificationClient {
    pub fn new(
        base_url: &str,
        verify_endpoint: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        let verify_url = verification_url(base_url, verify_endpoint)?;
        debug!("Creating VerificationClient for {}", verify_url);

        Ok(Self {
            verify_url,
            transport,
            codec: JsonCodec::new(),
        })
    }

    pub fn from_config(config: &VerifierConfig) -> Result<Self, ConfigError> {
        let transport = match config.timeout() {
            Some(timeout) => ReqwestTransport::with_timeout(timeout)?,
            None => ReqwestTransport::new()?,
        };
        Self::new(
            &config.base_url,
            &config.verify_endpoint,
            Arc::new(transport),
        )
    }

    pub fn with_codec(mut self, codec: JsonCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn verify_url(&self) -> &Url {
        &self.verify_url
    }

    /// Verifies a certificate payload and returns the response only if the
    /// service reported a success state.
    ///
    /// Fails with [`ResponseParseError`] when no response could be obtained
    /// or understood, and with [`ValidationError`] carrying the error state
    /// (or, failing that, the invalid state) when the certificate was
    /// rejected.
    pub async fn validate<P>(&self, payload: &P) -> VerifyResult<VerificationResponse>
    where
        P: Serialize + ?Sized + Sync,
    {
        match self.verify(payload).await {
            VerifyOutcome::Response(response) if response.is_success() => Ok(response),
            VerifyOutcome::Response(response) => {
                Err(ValidationError::new(response.into_rejection()).into())
            }
            VerifyOutcome::Absent(reason) => {
                debug!("No verification response: {:?}", reason);
                Err(ResponseParseError::empty().into())
            }
            VerifyOutcome::Unparseable(e) => Err(e.into()),
        }
    }

    /// Sends the payload and decodes the reply without classifying it.
    pub async fn verify<P>(&self, payload: &P) -> VerifyOutcome
    where
        P: Serialize + ?Sized + Sync,
    {
        let body = match self.codec.encode(payload) {
            Ok(body) => body,
            Err(e) => {
                error!("Couldn't serialize certificate payload: {}", e);
                return VerifyOutcome::Absent(AbsentReason::Encode);
            }
        };

        let request = HttpRequest {
            url: self.verify_url.clone(),
            headers: json_headers(),
            body,
        };

        let reply = match self.transport.post(request).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Couldn't verify certificate: {}", e);
                return VerifyOutcome::Absent(AbsentReason::Transport);
            }
        };

        if reply.status != StatusCode::OK {
            info!(
                "Certificate couldn't be decoded: HTTP {}",
                reply.status.as_u16()
            );
            return VerifyOutcome::Absent(AbsentReason::Status(reply.status));
        }

        match self.codec.decode_response(&reply.body) {
            Ok(Some(response)) => VerifyOutcome::Response(response),
            Ok(None) => VerifyOutcome::Absent(AbsentReason::NullBody),
            Err(e) => VerifyOutcome::Unparseable(e),
        }
    }
}
