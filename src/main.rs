use phishing_analyzer::config::{load_config, Config, Secrets};
use phishing_analyzer::models::Result;
use phishing_analyzer::openai::RiskAssessor;
use phishing_analyzer::server::{build_rocket, ServerState};
use phishing_analyzer::virustotal::VirusTotalClient;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration before logging so the configured level applies.
    let (config, config_error) = match load_config("config.yml").await {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let default_filter = format!(
        "phishing_analyzer={},rocket=warn,hyper=warn",
        config.logging.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Some(e) = config_error {
        warn!("Failed to load config.yml: {}. Using defaults.", e);
    }

    // Both API keys are required; a deployment without them cannot do
    // anything useful, so refuse to start instead of failing every request.
    let secrets = Secrets::from_env()?;

    let timeout = Duration::from_secs(config.analysis.http_timeout_seconds);
    let scanner = VirusTotalClient::new(secrets.virustotal_api_key, timeout);
    let assessor = RiskAssessor::new(
        secrets.openai_api_key,
        config.analysis.model.clone(),
        config.analysis.temperature,
        config.analysis.max_tokens,
        timeout,
    );

    info!("Starting phishing analyzer on port {}", config.server.port);
    let _rocket = build_rocket(ServerState { scanner, assessor }, config.server.port)
        .launch()
        .await?;

    Ok(())
}
