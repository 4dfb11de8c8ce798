//! Free-text alert extraction layer.

pub mod backends;
pub mod model;
pub mod patterns;

use std::{sync::Arc, time::Instant};

use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;
use tracing::info;

use crate::{
    cli::ExtractMethod,
    config::Settings,
    data::record::{AlertRecord, SourceMethod},
};

pub use model::{InferenceService, ModelAlertExtractor};
pub use patterns::TextAlertExtractor;

/// Interchangeable extraction strategies. Every variant yields the same record shape.
#[derive(Debug, Clone)]
pub enum AlertExtractor {
    TextPattern(TextAlertExtractor),
    ModelBackendA(ModelAlertExtractor),
    ModelBackendB(ModelAlertExtractor),
}

impl AlertExtractor {
    pub fn source_method(&self) -> SourceMethod {
        match self {
            Self::TextPattern(_) => SourceMethod::TextPattern,
            Self::ModelBackendA(m) | Self::ModelBackendB(m) => m.source_method(),
        }
    }

    /// Extract one alert. Failures come back as degraded records, never as errors.
    pub async fn extract(&self, raw_text: &str) -> AlertRecord {
        match self {
            Self::TextPattern(t) => t.extract(raw_text),
            Self::ModelBackendA(m) | Self::ModelBackendB(m) => m.extract(raw_text).await,
        }
    }
}

/// One extractor's result in a comparison run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRun {
    pub source_method: SourceMethod,
    pub elapsed_ms: u64,
    pub record: AlertRecord,
}

impl ExtractionRun {
    pub fn succeeded(&self) -> bool {
        !self.record.is_degraded()
    }
}

/// Run every extractor over the same text concurrently, preserving extractor order.
pub async fn compare(raw_text: &str, extractors: &[AlertExtractor]) -> Vec<ExtractionRun> {
    let runs = extractors.iter().map(|extractor| async move {
        let started = Instant::now();
        let record = extractor.extract(raw_text).await;
        ExtractionRun {
            source_method: extractor.source_method(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            record,
        }
    });
    let results = join_all(runs).await;
    let failed = results.iter().filter(|run| !run.succeeded()).count();
    info!(extractors = results.len(), failed, "extraction comparison finished");
    results
}

/// Build the requested extractors from configuration.
pub fn build_extractors(settings: &Settings, methods: &[ExtractMethod]) -> Result<Vec<AlertExtractor>> {
    let mut extractors = Vec::with_capacity(methods.len());
    for method in methods {
        let extractor = match method {
            ExtractMethod::Regex => AlertExtractor::TextPattern(TextAlertExtractor::new()),
            ExtractMethod::Openai => {
                let service = backends::OpenAiChat::from_settings(settings)?;
                AlertExtractor::ModelBackendA(ModelAlertExtractor::new(
                    SourceMethod::ModelBackendA,
                    Arc::new(service),
                ))
            }
            ExtractMethod::Ollama => {
                let service = backends::OllamaGenerate::from_settings(settings)?;
                AlertExtractor::ModelBackendB(ModelAlertExtractor::new(
                    SourceMethod::ModelBackendB,
                    Arc::new(service),
                ))
            }
        };
        extractors.push(extractor);
    }
    Ok(extractors)
}
