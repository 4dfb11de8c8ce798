//! Runtime configuration utilities for ps-analyzer.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_ALERTS_URL: &str =
    "https://collector-otp-prod.camsys-apps.com/realtime/gtfsrt/filtered/alerts";
const DEFAULT_AGENCY: &str = "MTASBWY";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "mistral";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Real-time alerts endpoint.
    pub alerts_base_url: String,
    /// Optional API key sent with alert feed requests.
    pub alerts_api_key: Option<String>,
    /// Agency identifier used to scope alert feed queries.
    pub agency_id: String,
    /// Key for the OpenAI-compatible chat backend.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    /// Base URL of a local Ollama daemon.
    pub ollama_url: String,
    pub ollama_model: String,
    /// Per-request timeout for every outbound call.
    pub request_timeout_secs: u64,
    /// Root folder for cached raw feeds.
    pub data_dir: PathBuf,
    /// Root folder for exported reports.
    pub outputs_dir: PathBuf,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let alerts_base_url =
            env::var("ALERTS_BASE_URL").unwrap_or_else(|_| DEFAULT_ALERTS_URL.to_string());
        let alerts_api_key = non_empty_var("ALERTS_API_KEY");
        let agency_id = env::var("ALERTS_AGENCY_ID").unwrap_or_else(|_| DEFAULT_AGENCY.to_string());
        let openai_api_key = non_empty_var("OPENAI_API_KEY");
        let openai_base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string());
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());
        let ollama_url = env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let ollama_model =
            env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string());
        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));

        std::fs::create_dir_all(&data_dir).context("creating data dir")?;
        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            alerts_base_url,
            alerts_api_key,
            agency_id,
            openai_api_key,
            openai_base_url,
            openai_model,
            ollama_url,
            ollama_model,
            request_timeout_secs,
            data_dir,
            outputs_dir,
        })
    }

    /// Built-in defaults rooted at explicit directories; ignores the environment.
    pub fn with_dirs(data_dir: impl Into<PathBuf>, outputs_dir: impl Into<PathBuf>) -> Self {
        Self {
            alerts_base_url: DEFAULT_ALERTS_URL.to_string(),
            alerts_api_key: None,
            agency_id: DEFAULT_AGENCY.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: data_dir.into(),
            outputs_dir: outputs_dir.into(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Convenience helper for derived path segments.
    pub fn join_data<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.data_dir.join(path)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
