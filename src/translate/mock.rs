use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::interface::{TranslateError, TranslateRequest, Translator};

/// Test translator that echoes `"<tgt>:<text>"` and counts invocations
#[derive(Default)]
pub struct EchoTranslator {
    calls: AtomicUsize,
}

impl EchoTranslator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for EchoTranslator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn translate(&self, request: TranslateRequest) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}:{}", request.target_lang, request.text))
    }
}

/// Test translator that always fails like an unreachable service
pub struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn translate(&self, _request: TranslateRequest) -> Result<String, TranslateError> {
        Err(TranslateError::Backend("model crashed".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}
