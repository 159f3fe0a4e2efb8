//! # hcertcheck - Health Certificate Verification Client
//!
//! A Rust library for checking health certificates (`HC1:` encoded EU digital COVID certificates
//! and Swiss light certificates) against a remote verification service. The library posts the
//! certificate as JSON, decodes the service's answer and tells apart the three things that can
//! happen: the certificate is valid, the service rejected it, or no usable answer came back.
//!
//! ## Quick Start
//!
//! Add the following to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! hcertcheck = "0.1.0"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! ## Basic Usage
//!
//! ### 1. Build a Client
//!
//! The verification URL is the base URL followed by the endpoint path, exactly as given:
//!
//! ```no_run
//! use std::sync::Arc;
//! use hcertcheck::client::VerificationClient;
//! use hcertcheck::transport::ReqwestTransport;
//!
//! # fn build() -> Result<(), hcertcheck::error::ConfigError> {
//! let client = VerificationClient::new(
//!     "https://verifier.example.ch",
//!     "/v1/verify",
//!     Arc::new(ReqwestTransport::new()?),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! Or from a JSON config file:
//!
//! ```no_run
//! use std::path::Path;
//! use hcertcheck::{client::VerificationClient, config::VerifierConfig};
//!
//! # fn build() -> Result<(), hcertcheck::error::ConfigError> {
//! let config = VerifierConfig::from_file(Path::new("verifier.json"))?;
//! let client = VerificationClient::from_config(&config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. Validate a Certificate
//!
//! ```no_run
//! use std::sync::Arc;
//! use hcertcheck::{
//!     client::VerificationClient, error::VerifyError, request::HCertPayload,
//!     transport::ReqwestTransport,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = VerificationClient::new(
//! #     "https://verifier.example.ch",
//! #     "/v1/verify",
//! #     Arc::new(ReqwestTransport::new()?),
//! # )?;
//! match client.validate(&HCertPayload::new("HC1:NCFOXN...")).await {
//!     Ok(response) => println!("Valid certificate: {:?}", response.certificate),
//!     Err(VerifyError::Validation(e)) => println!("Rejected: {}", e.rejection()),
//!     Err(VerifyError::ResponseParse(e)) => println!("No usable answer: {:?}", e.diagnostic()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Certificate Decoding
//!
//! The embedded certificate is decoded by a [`certificate::CertificateDecoder`]. Any function
//! from a JSON node to a certificate can replace the default rule:
//!
//! ```no_run
//! use hcertcheck::certificate::{CertificateDecoder, CovidCertificate, HealthCertDecoder};
//! use hcertcheck::codec::JsonCodec;
//! use serde_json::Value;
//!
//! fn strict(node: Value) -> serde_json::Result<CovidCertificate> {
//!     log::debug!("decoding certificate {}", node);
//!     HealthCertDecoder.decode(node)
//! }
//!
//! let codec = JsonCodec::new().with_certificate_decoder(strict);
//! ```
//!
//! Pass the codec to [`client::VerificationClient::with_codec`].

pub mod certificate;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;
pub mod utils;
