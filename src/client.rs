use anyhow::{Result, anyhow};
use hcertcheck::{
    client::VerificationClient, config::VerifierConfig, error::VerifyError,
    request::HCertPayload,
};
use log::{info, warn};

pub struct VerifyClient {
    config: VerifierConfig,
}

impl VerifyClient {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self, hcert: &str) -> Result<()> {
        let client = VerificationClient::from_config(&self.config)?;
        info!("Verifying certificate against {}", client.verify_url());

        match client.validate(&HCertPayload::new(hcert)).await {
            Ok(response) => {
                info!("Certificate is valid");
                println!("{}", serde_json::to_string_pretty(&response)?);
                Ok(())
            }
            Err(VerifyError::Validation(e)) => Err(anyhow!(e)),
            Err(VerifyError::ResponseParse(e)) => {
                if let Some(tree) = e.diagnostic() {
                    warn!("Unexpected verification response: {}", tree);
                }
                Err(anyhow!(e))
            }
        }
    }
}
