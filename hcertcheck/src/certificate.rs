//! Health certificate embedded in a verification response.
//!
//! The service sends either a full EU digital COVID certificate or a Swiss
//! light certificate under the same field. Which one it is can only be told
//! from the keys present, so decoding goes through a [`CertificateDecoder`]
//! instead of a plain derive. [`HealthCertDecoder`] is the default rule; a
//! [`JsonCodec`](crate::codec::JsonCodec) can be given a different one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Keys that only appear on a full certificate.
const DCC_ENTRY_KEYS: [&str; 3] = ["v", "t", "r"];
const NAME_KEY: &str = "nam";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CovidCertificate {
    Dcc(DccCert),
    Light(LightCert),
}

impl CovidCertificate {
    pub fn person(&self) -> &PersonName {
        match self {
            CovidCertificate::Dcc(cert) => &cert.person,
            CovidCertificate::Light(cert) => &cert.person,
        }
    }

    pub fn date_of_birth(&self) -> &str {
        match self {
            CovidCertificate::Dcc(cert) => &cert.date_of_birth,
            CovidCertificate::Light(cert) => &cert.date_of_birth,
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self, CovidCertificate::Light(_))
    }
}

impl<'de> Deserialize<'de> for CovidCertificate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let node = Value::deserialize(deserializer)?;
        HealthCertDecoder.decode(node).map_err(de::Error::custom)
    }
}

/// Decode rule for the embedded certificate node.
///
/// Errors should be data errors (`serde::de::Error::custom` or a failed
/// `serde_json::from_value`) so the client reports them as a shape mismatch.
pub trait CertificateDecoder: Send + Sync {
    fn decode(&self, node: Value) -> Result<CovidCertificate, serde_json::Error>;
}

impl<F> CertificateDecoder for F
where
    F: Fn(Value) -> Result<CovidCertificate, serde_json::Error> + Send + Sync,
{
    fn decode(&self, node: Value) -> Result<CovidCertificate, serde_json::Error> {
        self(node)
    }
}

/// Default rule: any vaccination, test or recovery entry makes a full
/// certificate, a bare name and birth date makes a light certificate.
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthCertDecoder;

impl CertificateDecoder for HealthCertDecoder {
    fn decode(&self, node: Value) -> Result<CovidCertificate, serde_json::Error> {
        let object = node
            .as_object()
            .ok_or_else(|| {
                <serde_json::Error as de::Error>::custom("certificate must be a JSON object")
            })?;

        if DCC_ENTRY_KEYS.iter().any(|key| object.contains_key(*key)) {
            serde_json::from_value(node).map(CovidCertificate::Dcc)
        } else if object.contains_key(NAME_KEY) {
            serde_json::from_value(node).map(CovidCertificate::Light)
        } else {
            Err(de::Error::custom(
                "certificate has neither certificate entries nor a holder name",
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(rename = "fn", default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(rename = "fnt")]
    pub standardized_family_name: String,
    #[serde(rename = "gn", default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(rename = "gnt", default, skip_serializing_if = "Option::is_none")]
    pub standardized_given_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DccCert {
    #[serde(rename = "ver")]
    pub version: String,
    #[serde(rename = "nam")]
    pub person: PersonName,
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`; partial dates are legal.
    #[serde(rename = "dob")]
    pub date_of_birth: String,
    #[serde(rename = "v", default, skip_serializing_if = "Option::is_none")]
    pub vaccinations: Option<Vec<VaccinationEntry>>,
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<TestEntry>>,
    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    pub past_infections: Option<Vec<RecoveryEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightCert {
    #[serde(rename = "ver")]
    pub version: String,
    #[serde(rename = "nam")]
    pub person: PersonName,
    #[serde(rename = "dob")]
    pub date_of_birth: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationEntry {
    #[serde(rename = "tg")]
    pub disease: String,
    #[serde(rename = "vp")]
    pub vaccine: String,
    #[serde(rename = "mp")]
    pub medicinal_product: String,
    #[serde(rename = "ma")]
    pub marketing_authorization_holder: String,
    #[serde(rename = "dn")]
    pub dose_number: u32,
    #[serde(rename = "sd")]
    pub total_doses: u32,
    #[serde(rename = "dt")]
    pub vaccination_date: NaiveDate,
    #[serde(rename = "co")]
    pub country: String,
    #[serde(rename = "is")]
    pub issuer: String,
    #[serde(rename = "ci")]
    pub certificate_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEntry {
    #[serde(rename = "tg")]
    pub disease: String,
    #[serde(rename = "tt")]
    pub test_type: String,
    #[serde(rename = "nm", default, skip_serializing_if = "Option::is_none")]
    pub naa_test_name: Option<String>,
    #[serde(rename = "ma", default, skip_serializing_if = "Option::is_none")]
    pub rat_test_name_and_manufacturer: Option<String>,
    #[serde(rename = "sc")]
    pub sample_collected_at: DateTime<Utc>,
    #[serde(rename = "tr")]
    pub result: String,
    #[serde(rename = "tc", default, skip_serializing_if = "Option::is_none")]
    pub testing_centre: Option<String>,
    #[serde(rename = "co")]
    pub country: String,
    #[serde(rename = "is")]
    pub issuer: String,
    #[serde(rename = "ci")]
    pub certificate_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryEntry {
    #[serde(rename = "tg")]
    pub disease: String,
    #[serde(rename = "fr")]
    pub first_positive_result: NaiveDate,
    #[serde(rename = "co")]
    pub country: String,
    #[serde(rename = "is")]
    pub issuer: String,
    #[serde(rename = "df")]
    pub valid_from: NaiveDate,
    #[serde(rename = "du")]
    pub valid_until: NaiveDate,
    #[serde(rename = "ci")]
    pub certificate_identifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> Value {
        json!({"fn": "Muster", "fnt": "MUSTER", "gn": "Hans", "gnt": "HANS"})
    }

    #[test]
    fn vaccination_entries_decode_as_full_certificate() {
        let node = json!({
            "ver": "1.3.0",
            "nam": person(),
            "dob": "1943-02-01",
            "v": [{
                "tg": "840539006",
                "vp": "1119349007",
                "mp": "EU/1/20/1528",
                "ma": "ORG-100030215",
                "dn": 2,
                "sd": 2,
                "dt": "2021-04-30",
                "co": "CH",
                "is": "Bundesamt für Gesundheit (BAG)",
                "ci": "urn:uvci:01:CH:2987CC9617DD5593806D4285"
            }]
        });

        let cert = HealthCertDecoder.decode(node).unwrap();
        let CovidCertificate::Dcc(dcc) = &cert else {
            panic!("expected a full certificate, got {:?}", cert);
        };
        let vaccination = &dcc.vaccinations.as_ref().unwrap()[0];
        assert_eq!(vaccination.dose_number, 2);
        assert_eq!(
            vaccination.vaccination_date,
            NaiveDate::from_ymd_opt(2021, 4, 30).unwrap()
        );
        assert_eq!(cert.person().standardized_family_name, "MUSTER");
        assert!(!cert.is_light());
    }

    #[test]
    fn test_entry_reads_offset_timestamp() {
        let node = json!({
            "ver": "1.3.0",
            "nam": person(),
            "dob": "1943",
            "t": [{
                "tg": "840539006",
                "tt": "LP6464-4",
                "nm": "Roche LightCycler qPCR",
                "sc": "2021-05-29T10:15:00+02:00",
                "tr": "260415000",
                "tc": "Test centre",
                "co": "CH",
                "is": "BAG",
                "ci": "urn:uvci:01:CH:F0FDABC1708A81BB8F1D7A12"
            }]
        });

        let cert = HealthCertDecoder.decode(node).unwrap();
        let CovidCertificate::Dcc(dcc) = cert else {
            panic!("expected a full certificate");
        };
        let test = &dcc.tests.unwrap()[0];
        assert_eq!(test.sample_collected_at.to_rfc3339(), "2021-05-29T08:15:00+00:00");
        assert_eq!(dcc.date_of_birth, "1943");
    }

    #[test]
    fn name_without_entries_decodes_as_light_certificate() {
        let node = json!({"ver": "1.0.0", "nam": person(), "dob": "1943-02-01"});

        let cert = HealthCertDecoder.decode(node).unwrap();
        assert!(cert.is_light());
        assert_eq!(cert.date_of_birth(), "1943-02-01");
    }

    #[test]
    fn unknown_shape_is_a_data_error() {
        let err = HealthCertDecoder.decode(json!({"ver": "1.0.0"})).unwrap_err();
        assert_eq!(err.classify(), serde_json::error::Category::Data);

        let err = HealthCertDecoder.decode(json!("HC1:...")).unwrap_err();
        assert_eq!(err.classify(), serde_json::error::Category::Data);
    }

    #[test]
    fn plain_deserialize_uses_default_rule() {
        let cert: CovidCertificate = serde_json::from_value(json!({
            "ver": "1.0.0",
            "nam": {"fnt": "MUSTER"},
            "dob": "1943-02-01"
        }))
        .unwrap();

        assert!(cert.is_light());
        assert_eq!(cert.person().family_name, None);
    }
}
