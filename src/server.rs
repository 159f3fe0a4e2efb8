use actix_web::{App, HttpResponse, HttpServer, web};
use anyhow::Context;
use hcertcheck::{codec::JsonCodec, request::HCertPayload};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

const HCERT_PREFIX: &str = "HC1:";
const BASE45_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_address: String,
    pub fixture_path: Option<PathBuf>,
}

/// Stand-in for the verification service. It only looks at the outer
/// encoding of the certificate and answers every well-formed one with the
/// same canned success body.
pub struct StubVerifier {
    success_body: Value,
}

impl Default for StubVerifier {
    fn default() -> Self {
        Self {
            success_body: json!({"successState": {"isLightCertificate": false}}),
        }
    }
}

impl StubVerifier {
    pub fn from_fixture(path: &Path) -> Result<Self, anyhow::Error> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        let decoded = JsonCodec::new().decode_response(&json);
        match decoded {
            Ok(Some(response)) if response.is_success() => {}
            _ => anyhow::bail!(
                "fixture {} is not a successful verification response",
                path.display()
            ),
        }

        Ok(Self {
            success_body: serde_json::from_str(&json)?,
        })
    }

    pub fn answer(&self, hcert: &str) -> Value {
        let Some(encoded) = hcert.strip_prefix(HCERT_PREFIX) else {
            return json!({"errorState": "D|PRX"});
        };
        if encoded.is_empty() || !encoded.chars().all(|c| BASE45_ALPHABET.contains(c)) {
            return json!({"errorState": "D|B45"});
        }
        self.success_body.clone()
    }
}

async fn verify_handler(
    request: web::Json<HCertPayload>,
    verifier: web::Data<Arc<StubVerifier>>,
) -> HttpResponse {
    debug!("Received certificate of {} chars", request.hcert.len());
    HttpResponse::Ok().json(verifier.answer(&request.hcert))
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/verify", web::post().to(verify_handler));
}

pub struct ServerApp {
    config: ServerConfig,
    verifier: Arc<StubVerifier>,
}

impl ServerApp {
    pub fn new(config: ServerConfig) -> Result<Self, anyhow::Error> {
        let verifier = match &config.fixture_path {
            Some(path) => {
                let verifier = StubVerifier::from_fixture(path)?;
                info!("Loaded success fixture from {}", path.display());
                verifier
            }
            None => StubVerifier::default(),
        };

        Ok(Self {
            config,
            verifier: Arc::new(verifier),
        })
    }

    pub async fn run(self) -> std::io::Result<()> {
        let address = self.config.listen_address.clone();
        info!("Starting stub verification service on {}", address);

        let verifier = self.verifier;
        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(Arc::clone(&verifier)))
                .configure(routes)
        })
        .bind(address)?
        .run()
        .await
    }
}
