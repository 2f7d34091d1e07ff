/// Translate interface shared by the in-process model and the remote inference service

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("unsupported language code: {0}")]
    UnsupportedLanguage(String),

    #[error("model files missing: {0}")]
    ModelFiles(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("onnx runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("inference service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference service returned an error: {0}")]
    Backend(String),

    #[error("translation task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Translation backend.
///
/// Implementations hold the loaded model for the lifetime of the process
/// and must be shareable between requests.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Short backend name used in logs and the health endpoint
    fn name(&self) -> &str;

    /// Translate `request.text` from `source_lang` to `target_lang` (M2M100 codes)
    async fn translate(&self, request: TranslateRequest) -> Result<String, TranslateError>;

    /// Whether the backend is able to serve requests
    async fn health_check(&self) -> bool {
        true
    }
}
