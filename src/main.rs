use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hcertcheck::config::VerifierConfig;
use log::{LevelFilter, info};

mod client;
mod server;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8088";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a certificate against a verification service
    Verify {
        #[arg(short, long)]
        base_url: Option<String>,
        #[arg(short, long)]
        endpoint: Option<String>,
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// JSON config file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
        hcert: String,
    },
    /// Run a stub verification service for local testing
    Serve {
        #[arg(short, long, default_value = "127.0.0.1:8088")]
        address: String,
        /// Response body returned for well-formed certificates
        #[arg(short, long)]
        fixture: Option<PathBuf>,
    },
}

fn verifier_config(
    base_url: Option<String>,
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
    config: Option<PathBuf>,
) -> Result<VerifierConfig, anyhow::Error> {
    let mut verifier = match config {
        Some(path) => VerifierConfig::from_file(&path)?,
        None => VerifierConfig::new(DEFAULT_BASE_URL),
    };
    if let Some(base_url) = base_url {
        verifier.base_url = base_url;
    }
    if let Some(endpoint) = endpoint {
        verifier.verify_endpoint = endpoint;
    }
    if let Some(timeout_secs) = timeout_secs {
        verifier.timeout_secs = Some(timeout_secs);
    }
    Ok(verifier)
}

fn init_logging() {
    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::Info);

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    info!("Logging initialized with level: {}", log_level);
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Verify {
            base_url,
            endpoint,
            timeout_secs,
            config,
            hcert,
        } => {
            let config = verifier_config(base_url, endpoint, timeout_secs, config)?;
            client::VerifyClient::new(config).run(&hcert).await?;
        }
        Commands::Serve { address, fixture } => {
            let config = server::ServerConfig {
                listen_address: address,
                fixture_path: fixture,
            };
            server::ServerApp::new(config)?.run().await?;
        }
    }

    Ok(())
}
