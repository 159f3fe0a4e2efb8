use serde::{Deserialize, Serialize};

/// Certificate submission as sent to the verification service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HCertPayload {
    /// `HC1:` prefixed, base45 encoded certificate as scanned from the QR code.
    pub hcert: String,
}

impl HCertPayload {
    pub fn new(hcert: impl Into<String>) -> Self {
        Self {
            hcert: hcert.into(),
        }
    }
}
