use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use super::interface::{TranslateError, TranslateRequest, Translator};
use crate::inference_service::{InferenceServiceClient, ServiceTranslateRequest};

/// Translator that delegates generation to the inference service
pub struct RemoteTranslator {
    service: Arc<InferenceServiceClient>,
    name: String,
}

impl RemoteTranslator {
    pub fn new(service: Arc<InferenceServiceClient>, model_name: &str) -> Self {
        let name = format!("remote ({} @ {})", model_name, service.base_url());
        Self { service, name }
    }
}

#[async_trait]
impl Translator for RemoteTranslator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(&self, request: TranslateRequest) -> Result<String, TranslateError> {
        let service_request = ServiceTranslateRequest {
            text: request.text,
            src_lang: request.source_lang,
            tgt_lang: request.target_lang,
        };

        debug!(
            "Sending translate request: {} -> {}, {} chars",
            service_request.src_lang,
            service_request.tgt_lang,
            service_request.text.chars().count()
        );

        let response = self.service.translate(&service_request).await?;

        if response.success {
            Ok(response.translated_text)
        } else {
            let error_msg = response.error.unwrap_or_else(|| "Unknown error".to_string());
            error!("Remote translation failed: {}", error_msg);
            Err(TranslateError::Backend(error_msg))
        }
    }

    async fn health_check(&self) -> bool {
        self.service.health_check().await.unwrap_or(false)
    }
}
