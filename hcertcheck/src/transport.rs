use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{header::HeaderMap, redirect, Client, ClientBuilder, StatusCode};
use url::Url;

use crate::error::{ConfigError, TransportError};

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// One request/response exchange with the verification service.
///
/// Implementations return every HTTP status as a reply, redirects included,
/// and only fail on I/O. Timeouts are the transport's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: HttpRequest) -> Result<HttpReply, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Client that does not follow redirects, so a 3xx reaches the caller as
    /// a non-200 reply.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self::from_client(builder().build()?))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self::from_client(builder().timeout(timeout).build()?))
    }

    /// Wraps a caller-built client as-is; its redirect policy is kept.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn builder() -> ClientBuilder {
    Client::builder().redirect(redirect::Policy::none())
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        debug!("POST {}", request.url);
        let response = self
            .client
            .post(request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Received HTTP {} ({} bytes)", status.as_u16(), body.len());
        Ok(HttpReply { status, body })
    }
}
