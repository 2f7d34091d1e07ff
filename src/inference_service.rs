use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::translate::TranslateResponse;

/// Client for an HTTP inference service hosting the translation checkpoint
#[derive(Debug, Clone)]
pub struct InferenceServiceClient {
    client: Client,
    base_url: String,
}

/// Wire format of `POST /translate`
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceTranslateRequest {
    pub text: String,
    pub src_lang: String,
    pub tgt_lang: String,
}

impl InferenceServiceClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn translate(
        &self,
        request: &ServiceTranslateRequest,
    ) -> Result<TranslateResponse, reqwest::Error> {
        let url = format!("{}/translate", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let result: TranslateResponse = response.error_for_status()?.json().await?;
        Ok(result)
    }

    pub async fn health_check(&self) -> Result<bool, reqwest::Error> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}
