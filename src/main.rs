mod config_manager;
mod error;
mod handlers;
mod inference_service;
mod languages;
mod page;
mod routes;
mod scoring;
mod state;
mod translate;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config_manager::Config;
use state::AppState;

fn candidate_config_paths() -> Vec<String> {
    // Resolve relative paths against the executable as well as the working directory
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.jsonld".to_string()),
        exe_dir.join("conf.jsonld").canonicalize().ok().and_then(|p| p.to_str().map(|s| s.to_string())),
        Some("conf.yaml".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn load_config() -> Config {
    let config_paths = candidate_config_paths();

    for path in &config_paths {
        match Config::load(path) {
            Ok(cfg) => {
                info!("Loaded configuration from: {}", path);
                return cfg;
            }
            Err(e) => {
                tracing::debug!("Failed to load config from {}: {}", path, e);
            }
        }
    }

    warn!("No config file found (tried {:?}), using defaults", config_paths);
    Config::default()
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("m2m_translate_backend=debug,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config();
    let addr = config.system_config.socket_addr()?;

    info!(
        "Loading translator backend {} ({})",
        config.translator_config.backend.as_str(),
        config.translator_config.model_name
    );
    let app_state = AppState::new(config)?;
    info!("Translator ready: {}", app_state.translator.name());

    let app = routes::build_app(app_state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
