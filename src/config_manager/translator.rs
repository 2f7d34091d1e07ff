use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backend that runs the translation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslatorBackend {
    /// In-process ONNX Runtime inference
    #[serde(rename = "onnx_m2m100")]
    OnnxM2M100,
    /// HTTP inference service hosting the checkpoint
    #[serde(rename = "remote")]
    Remote,
}

impl TranslatorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslatorBackend::OnnxM2M100 => "onnx_m2m100",
            TranslatorBackend::Remote => "remote",
        }
    }
}

/// Configuration for the remote inference service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTranslatorConfig {
    #[serde(rename = "base_url")]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(rename = "timeout_secs")]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for RemoteTranslatorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_backend")]
    pub backend: TranslatorBackend,

    #[serde(rename = "model_name")]
    #[serde(default = "default_model_name")]
    pub model_name: String,

    #[serde(rename = "model_dir")]
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    #[serde(rename = "max_new_tokens")]
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: usize,

    /// Overrides the checkpoint's beam count; 1 selects greedy decoding
    #[serde(rename = "num_beams")]
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_beams: Option<usize>,

    #[serde(rename = "intra_threads")]
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,

    #[serde(default)]
    pub remote: RemoteTranslatorConfig,
}

fn default_backend() -> TranslatorBackend {
    TranslatorBackend::OnnxM2M100
}

fn default_model_name() -> String {
    "facebook/m2m100_418M".to_string()
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models/m2m100_418M")
}

fn default_max_new_tokens() -> usize {
    200
}

fn default_intra_threads() -> usize {
    4
}

impl TranslatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_new_tokens == 0 {
            return Err("max_new_tokens must be greater than zero".to_string());
        }
        if self.num_beams == Some(0) {
            return Err("num_beams must be greater than zero".to_string());
        }
        if self.intra_threads == 0 {
            return Err("intra_threads must be greater than zero".to_string());
        }
        if self.backend == TranslatorBackend::Remote && self.remote.base_url.is_empty() {
            return Err("remote.base_url is required for the remote backend".to_string());
        }
        Ok(())
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model_name: default_model_name(),
            model_dir: default_model_dir(),
            max_new_tokens: default_max_new_tokens(),
            num_beams: None,
            intra_threads: default_intra_threads(),
            remote: RemoteTranslatorConfig::default(),
        }
    }
}
