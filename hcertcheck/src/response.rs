use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{certificate::CovidCertificate, error::Rejection};

/// Decoded answer of the verification service.
///
/// A well-formed response populates at most one of `success_state`,
/// `error_state` and `invalid_state`. Fields the service adds later are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CovidCertificate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_state: Option<SuccessState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_state: Option<ErrorState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_state: Option<InvalidState>,
}

impl VerificationResponse {
    pub fn is_success(&self) -> bool {
        self.success_state.is_some()
    }

    /// Error state wins over invalid state when both are set.
    pub fn into_rejection(self) -> Rejection {
        match (self.error_state, self.invalid_state) {
            (Some(error), _) => Rejection::Error(error),
            (None, Some(invalid)) => Rejection::Invalid(invalid),
            (None, None) => Rejection::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessState {
    #[serde(default)]
    pub is_light_certificate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_range: Option<ValidityRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDateTime>,
}

/// Processing error reported by the service, either as a bare code
/// (`"EXPIRED"`, `"D|B45"`) or as an object with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorState {
    Code(String),
    Detailed {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ErrorState {
    pub fn code(&self) -> &str {
        match self {
            ErrorState::Code(code) => code,
            ErrorState::Detailed { code, .. } => code,
        }
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorState::Detailed {
                code,
                message: Some(message),
            } => write!(f, "{} ({})", code, message),
            _ => f.write_str(self.code()),
        }
    }
}

/// Certificate decoded fine but failed a validity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InvalidState {
    Reason(String),
    Checks(InvalidChecks),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidChecks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_rules_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_range: Option<ValidityRange>,
}

impl fmt::Display for InvalidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidState::Reason(reason) => f.write_str(reason),
            InvalidState::Checks(checks) => {
                let failed: Vec<String> = [
                    ("signature", &checks.signature_state),
                    ("revocation", &checks.revocation_state),
                    ("national rules", &checks.national_rules_state),
                ]
                .iter()
                .filter_map(|(name, state)| state.as_ref().map(|s| format!("{}={}", name, s)))
                .collect();

                if failed.is_empty() {
                    f.write_str("unspecified")
                } else {
                    f.write_str(&failed.join(", "))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_state_ignores_unknown_fields() {
        let response: VerificationResponse =
            serde_json::from_str(r#"{"successState":{"valid":true},"extra":1}"#).unwrap();

        assert!(response.is_success());
        assert_eq!(response.success_state, Some(SuccessState::default()));
        assert!(response.error_state.is_none());
        assert!(response.invalid_state.is_none());
    }

    #[test]
    fn validity_range_reads_local_date_times() {
        let response: VerificationResponse = serde_json::from_str(
            r#"{"successState":{"isLightCertificate":true,
                "validityRange":{"validFrom":"2021-06-01T00:00:00","validUntil":"2022-06-01T00:00:00"}}}"#,
        )
        .unwrap();

        let success = response.success_state.unwrap();
        assert!(success.is_light_certificate);
        let range = success.validity_range.unwrap();
        assert_eq!(
            range.valid_from.unwrap().format("%Y-%m-%d").to_string(),
            "2021-06-01"
        );
        assert_eq!(
            range.valid_until.unwrap().format("%Y-%m-%d").to_string(),
            "2022-06-01"
        );
    }

    #[test]
    fn error_state_accepts_code_or_object() {
        let bare: ErrorState = serde_json::from_str(r#""EXPIRED""#).unwrap();
        assert_eq!(bare, ErrorState::Code("EXPIRED".to_string()));

        let detailed: ErrorState =
            serde_json::from_str(r#"{"code":"D|B45","message":"base45 decoding failed"}"#).unwrap();
        assert_eq!(detailed.code(), "D|B45");
        assert_eq!(detailed.to_string(), "D|B45 (base45 decoding failed)");
    }

    #[test]
    fn rejection_prefers_error_state() {
        let response: VerificationResponse = serde_json::from_str(
            r#"{"errorState":"EXPIRED","invalidState":{"signatureState":"INVALID"}}"#,
        )
        .unwrap();

        assert_eq!(
            response.into_rejection(),
            Rejection::Error(ErrorState::Code("EXPIRED".to_string()))
        );
    }

    #[test]
    fn rejection_falls_back_to_invalid_state() {
        let response: VerificationResponse = serde_json::from_str(
            r#"{"invalidState":{"signatureState":"INVALID","revocationState":"REVOKED"}}"#,
        )
        .unwrap();

        let rejection = response.into_rejection();
        assert_eq!(
            rejection.to_string(),
            "invalid state signature=INVALID, revocation=REVOKED"
        );
    }

    #[test]
    fn empty_response_has_unspecified_rejection() {
        let response: VerificationResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.is_success());
        assert_eq!(response.into_rejection(), Rejection::Unspecified);
    }
}
