//! Sahayak application binary - composition root.
//!
//! Ties together all Sahayak crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Wire the session registry and turn orchestration
//! 3. Connect the external collaborators (Ollama, Bhashini, form bridge)
//! 4. Start the axum REST API server

use std::path::PathBuf;
use std::sync::Arc;

use sahayak_api::{routes, AppState};
use sahayak_core::config::SahayakConfig;
use sahayak_extract::OllamaExtractor;
use sahayak_form::BridgeFormFiller;
use sahayak_speech::BhashiniClient;

/// Resolve the config file path (SAHAYAK_CONFIG env, or ./sahayak.toml).
fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("SAHAYAK_CONFIG") {
        return PathBuf::from(p);
    }
    PathBuf::from("sahayak.toml")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Sahayak v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = config_path();
    let config = SahayakConfig::load_or_default(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Screenshot directory must exist before the first fill.
    if let Err(e) = std::fs::create_dir_all(&config.form.screenshots_dir) {
        tracing::error!(
            dir = %config.form.screenshots_dir,
            error = %e,
            "Failed to create screenshots directory"
        );
        return Err(e.into());
    }

    // External collaborators.
    let extractor = Arc::new(OllamaExtractor::new(config.ollama.clone()));
    tracing::info!(url = %config.ollama.url, model = %config.ollama.model, "Ollama extractor ready");

    let transcriber = Arc::new(BhashiniClient::new(config.bhashini.clone()));
    if config.bhashini.api_key.is_empty() {
        tracing::warn!("Bhashini API key not set; voice input will be unavailable");
    }

    let filler = Arc::new(BridgeFormFiller::new(config.form.clone()));
    tracing::info!(bridge = %config.form.bridge_url, "Form automation bridge configured");

    let state = AppState::new(config, extractor, transcriber, filler);

    routes::start_server(state).await?;

    Ok(())
}
