//! HTTP inference services behind the model extractors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::Settings,
    errors::ServiceError,
    nlp::model::{build_prompt, InferenceService},
};

fn http_client(timeout: Duration) -> Result<Client, ServiceError> {
    Client::builder()
        .user_agent("ps-analyzer/0.1")
        .timeout(timeout)
        .build()
        .map_err(|err| ServiceError::Unavailable(err.to_string()))
}

fn check_status(status: StatusCode) -> Result<(), ServiceError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ServiceError::Unauthorized),
        s if s.is_success() => Ok(()),
        s => Err(ServiceError::Unavailable(format!("HTTP {s}"))),
    }
}

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChat {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ServiceError> {
        Self::new(
            settings.openai_base_url.clone(),
            settings.openai_api_key.clone(),
            settings.openai_model.clone(),
            settings.request_timeout(),
        )
    }
}

#[async_trait]
impl InferenceService for OpenAiChat {
    fn name(&self) -> &str {
        "openai"
    }

    async fn infer(&self, instructions: &str, input: &str) -> Result<String, ServiceError> {
        let Some(key) = &self.api_key else {
            return Err(ServiceError::Unauthorized);
        };
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": instructions },
                { "role": "user", "content": input }
            ],
        });
        let resp = self
            .client
            .post(url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        check_status(resp.status())?;
        let payload: ChatResponse = resp.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ServiceError::Unavailable("empty completion".into()))
    }
}

/// Local Ollama `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaGenerate {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaGenerate {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ServiceError> {
        Self::new(
            settings.ollama_url.clone(),
            settings.ollama_model.clone(),
            settings.request_timeout(),
        )
    }
}

#[async_trait]
impl InferenceService for OllamaGenerate {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn infer(&self, instructions: &str, input: &str) -> Result<String, ServiceError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "prompt": build_prompt(instructions, input),
            "stream": false,
            "format": "json",
        });
        let resp = self.client.post(url).json(&body).send().await?;
        check_status(resp.status())?;
        let payload: GenerateResponse = resp.json().await?;
        Ok(payload.response)
    }
}
