use std::{fmt, sync::Arc};

use log::debug;
use serde::Serialize;
use serde_json::{error::Category, Value};

use crate::{
    certificate::{CertificateDecoder, HealthCertDecoder},
    error::ResponseParseError,
    response::VerificationResponse,
};

const CERTIFICATE_FIELD: &str = "certificate";

/// JSON codec shared by every call of a client.
///
/// Unknown response fields are ignored, temporal fields go through chrono and
/// the embedded certificate is decoded with the registered
/// [`CertificateDecoder`]. The codec holds no mutable state.
#[derive(Clone)]
pub struct JsonCodec {
    certificate_decoder: Arc<dyn CertificateDecoder>,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self {
            certificate_decoder: Arc::new(HealthCertDecoder),
        }
    }
}

impl fmt::Debug for JsonCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonCodec").finish_non_exhaustive()
    }
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_certificate_decoder<D>(mut self, decoder: D) -> Self
    where
        D: CertificateDecoder + 'static,
    {
        self.certificate_decoder = Arc::new(decoder);
        self
    }

    pub fn encode<T>(&self, value: &T) -> serde_json::Result<String>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_string(value)
    }

    pub fn parse_tree(&self, body: &str) -> serde_json::Result<Value> {
        serde_json::from_str(body)
    }

    /// Decodes a verification response body.
    ///
    /// Returns `Ok(None)` for a JSON `null` body. A body that is JSON but of
    /// the wrong shape fails with the parsed tree attached; anything else
    /// fails without a diagnostic.
    pub fn decode_response(
        &self,
        body: &str,
    ) -> Result<Option<VerificationResponse>, ResponseParseError> {
        let tree = match self.parse_tree(body) {
            Ok(tree) => tree,
            Err(e) => {
                debug!("Verification response is not JSON: {}", e);
                return Err(ResponseParseError::empty());
            }
        };

        if tree.is_null() {
            return Ok(None);
        }

        match self.decode_tree(&tree) {
            Ok(response) => Ok(Some(response)),
            Err(e) if e.classify() == Category::Data => {
                debug!("Verification response has an unexpected shape: {}", e);
                Err(ResponseParseError::new(Some(tree)))
            }
            Err(e) => {
                debug!("Verification response couldn't be decoded: {}", e);
                Err(ResponseParseError::empty())
            }
        }
    }

    fn decode_tree(&self, tree: &Value) -> serde_json::Result<VerificationResponse> {
        let mut tree = tree.clone();
        let certificate = tree
            .as_object_mut()
            .and_then(|object| object.remove(CERTIFICATE_FIELD));

        let mut response: VerificationResponse = serde_json::from_value(tree)?;
        response.certificate = match certificate {
            None | Some(Value::Null) => None,
            Some(node) => Some(self.certificate_decoder.decode(node)?),
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::{CovidCertificate, LightCert, PersonName};
    use serde_json::json;

    #[test]
    fn decodes_success_response() {
        let response = JsonCodec::new()
            .decode_response(r#"{"successState":{"valid":true}}"#)
            .unwrap()
            .unwrap();

        assert!(response.is_success());
        assert!(response.certificate.is_none());
    }

    #[test]
    fn decodes_embedded_light_certificate() {
        let body = json!({
            "certificate": {"ver": "1.0.0", "nam": {"fnt": "MUSTER", "gnt": "HANS"}, "dob": "1943-02-01"},
            "successState": {"isLightCertificate": true}
        })
        .to_string();

        let response = JsonCodec::new().decode_response(&body).unwrap().unwrap();
        let cert = response.certificate.unwrap();
        assert!(cert.is_light());
        assert_eq!(cert.person().standardized_given_name.as_deref(), Some("HANS"));
    }

    #[test]
    fn null_body_is_absent() {
        assert_eq!(JsonCodec::new().decode_response("null"), Ok(None));
    }

    #[test]
    fn shape_mismatch_keeps_parsed_tree() {
        let body = r#"{"successState":"yes","errorState":[1,2]}"#;

        let err = JsonCodec::new().decode_response(body).unwrap_err();
        assert_eq!(
            err.diagnostic(),
            Some(&json!({"successState": "yes", "errorState": [1, 2]}))
        );
    }

    #[test]
    fn non_object_json_is_a_shape_mismatch() {
        let err = JsonCodec::new().decode_response(r#""HC1:...""#).unwrap_err();
        assert_eq!(err.into_diagnostic(), Some(json!("HC1:...")));
    }

    #[test]
    fn broken_certificate_is_a_shape_mismatch() {
        let body = json!({"certificate": {"dob": "1943"}, "successState": {}});

        let err = JsonCodec::new()
            .decode_response(&body.to_string())
            .unwrap_err();
        assert_eq!(err.diagnostic(), Some(&body));
    }

    #[test]
    fn invalid_json_has_no_diagnostic() {
        let codec = JsonCodec::new();
        assert_eq!(
            codec.decode_response("<html>Bad Gateway</html>"),
            Err(ResponseParseError::empty())
        );
        assert_eq!(codec.decode_response(""), Err(ResponseParseError::empty()));
        assert_eq!(
            codec.decode_response(r#"{"successState":"#),
            Err(ResponseParseError::empty())
        );
    }

    fn birth_date_only(node: Value) -> serde_json::Result<CovidCertificate> {
        let dob = node["birthDate"].as_str().unwrap_or_default().to_string();
        Ok(CovidCertificate::Light(LightCert {
            version: "1.0.0".to_string(),
            person: PersonName {
                family_name: None,
                standardized_family_name: "UNKNOWN".to_string(),
                given_name: None,
                standardized_given_name: None,
            },
            date_of_birth: dob,
        }))
    }

    #[test]
    fn custom_decoder_overrides_default_rule() {
        let codec = JsonCodec::new().with_certificate_decoder(birth_date_only);

        let body = r#"{"certificate":{"birthDate":"1980-01-01"},"successState":{}}"#;
        let response = codec.decode_response(body).unwrap().unwrap();
        assert_eq!(response.certificate.unwrap().date_of_birth(), "1980-01-01");
    }

    #[test]
    fn encodes_payload_as_is() {
        let body = JsonCodec::new().encode(&json!({"id": "abc"})).unwrap();
        assert_eq!(body, r#"{"id":"abc"}"#);
    }
}
