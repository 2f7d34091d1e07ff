use std::sync::Arc;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config_manager::Config;
use crate::scoring::BleuOptions;
use crate::translate::{Translator, TranslatorFactory};

/// Process-wide state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub translator: Arc<dyn Translator>,
    pub bleu_options: Arc<BleuOptions>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Load the configured translator; this is the only place model weights are loaded
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let translator = TranslatorFactory::create_translator(&config.translator_config)?;
        Ok(Self::with_translator(config, translator))
    }

    pub fn with_translator(config: Config, translator: Arc<dyn Translator>) -> Self {
        let bleu_options = BleuOptions::from(&config.scoring_config);
        Self {
            config: Arc::new(config),
            translator,
            bleu_options: Arc::new(bleu_options),
            started_at: Utc::now(),
        }
    }

    pub fn generate_request_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
