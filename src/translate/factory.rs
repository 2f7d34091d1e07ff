use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use tracing::info;
use crate::config_manager::translator::{TranslatorBackend, TranslatorConfig};
use crate::inference_service::InferenceServiceClient;
use super::interface::Translator;
use super::m2m100_onnx::OnnxM2M100Translator;
use super::remote::RemoteTranslator;

/// Factory for creating translation backends
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the translator selected by configuration.
    ///
    /// Model weights are loaded here, once per process.
    pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<dyn Translator>> {
        info!(
            "Initializing translator: backend={}, model={}",
            config.backend.as_str(),
            config.model_name
        );

        match config.backend {
            TranslatorBackend::OnnxM2M100 => {
                let translator = OnnxM2M100Translator::load(
                    &config.model_dir,
                    &config.model_name,
                    config.max_new_tokens,
                    config.num_beams,
                    config.intra_threads,
                )?;
                Ok(Arc::new(translator))
            }
            TranslatorBackend::Remote => {
                let service = InferenceServiceClient::new(
                    config.remote.base_url.clone(),
                    Duration::from_secs(config.remote.timeout_secs),
                )?;
                Ok(Arc::new(RemoteTranslator::new(Arc::new(service), &config.model_name)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_backend_needs_no_local_files() {
        let config = TranslatorConfig {
            backend: TranslatorBackend::Remote,
            ..Default::default()
        };
        let translator = TranslatorFactory::create_translator(&config).unwrap();
        assert!(translator.name().starts_with("remote"));
    }

    #[test]
    fn onnx_backend_fails_without_model_dir() {
        let config = TranslatorConfig {
            model_dir: "/nonexistent/m2m100".into(),
            ..Default::default()
        };
        assert!(TranslatorFactory::create_translator(&config).is_err());
    }
}
