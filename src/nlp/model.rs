//! Model-backed extraction: prompt an inference service, validate its reply, build a record.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    data::record::{AlertRecord, LineDetail, ServiceChanges, SourceMethod, Suspension},
    errors::{AlertError, ServiceError},
};

/// Schema description sent with every extraction prompt.
pub const SCHEMA_INSTRUCTIONS: &str = r#"You are a specialized subway service-change alert parser. Your task is to:
1. Identify ALL affected subway lines (both explicit [X] mentions and implicit mentions in descriptions)
2. Extract service changes including:
   - Service suspensions and their locations
   - Reroutes and alternate service
   - Skip-stop patterns
   - Running sections

Respond with ONLY valid JSON in this exact format:
{
    "affected_lines": ["A", "B"],
    "service_changes": {
        "suspensions": [{"line": "A", "from": "station1", "to": "station2"}],
        "reroutes": [{"line": "A", "detail": "reroute info"}],
        "alternate_service": [{"line": "B", "detail": "alternate service info"}]
    }
}"#;

/// External natural-language service that turns instructions plus one input into raw text.
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// `instructions` is the fixed schema description; `input` carries the alert.
    async fn infer(&self, instructions: &str, input: &str) -> Result<String, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct ExtractionPayload {
    affected_lines: Vec<String>,
    service_changes: ChangesPayload,
}

#[derive(Debug, Deserialize)]
struct ChangesPayload {
    suspensions: Vec<SuspensionPayload>,
    reroutes: Vec<DetailPayload>,
    alternate_service: Vec<DetailPayload>,
}

#[derive(Debug, Deserialize)]
struct SuspensionPayload {
    line: String,
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct DetailPayload {
    line: String,
    detail: String,
}

impl From<DetailPayload> for LineDetail {
    fn from(value: DetailPayload) -> Self {
        LineDetail {
            line: value.line,
            detail: value.detail,
        }
    }
}

/// The per-alert request sent alongside [`SCHEMA_INSTRUCTIONS`].
pub fn alert_request(raw_text: &str) -> String {
    format!("Parse this alert:\n\n{raw_text}")
}

/// Single prompt for services without a separate instruction channel.
pub fn build_prompt(instructions: &str, input: &str) -> String {
    format!("{instructions}\n\n{input}")
}

/// Validate a raw service reply against the extraction schema.
///
/// Every key is required; a missing key, a wrong type, or a non-JSON payload is
/// rejected rather than coerced.
pub fn parse_response(
    raw_response: &str,
    raw_text: &str,
    source_method: SourceMethod,
) -> Result<AlertRecord, AlertError> {
    let payload: ExtractionPayload = serde_json::from_str(raw_response.trim())
        .map_err(|err| AlertError::SchemaValidation(err.to_string()))?;

    let mut record = AlertRecord::new(source_method).with_lines(payload.affected_lines);
    record.description_text = raw_text.to_string();
    record.service_changes = ServiceChanges {
        suspensions: payload
            .service_changes
            .suspensions
            .into_iter()
            .map(|s| Suspension {
                line: s.line,
                from: s.from,
                to: s.to,
            })
            .collect(),
        reroutes: payload
            .service_changes
            .reroutes
            .into_iter()
            .map(LineDetail::from)
            .collect(),
        alternate_service: payload
            .service_changes
            .alternate_service
            .into_iter()
            .map(LineDetail::from)
            .collect(),
    };
    Ok(record)
}

/// Extractor delegating to an [`InferenceService`].
#[derive(Clone)]
pub struct ModelAlertExtractor {
    source_method: SourceMethod,
    service: Arc<dyn InferenceService>,
}

impl std::fmt::Debug for ModelAlertExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelAlertExtractor")
            .field("source_method", &self.source_method)
            .field("service", &self.service.name())
            .finish()
    }
}

impl ModelAlertExtractor {
    pub fn new(source_method: SourceMethod, service: Arc<dyn InferenceService>) -> Self {
        Self {
            source_method,
            service,
        }
    }

    pub fn source_method(&self) -> SourceMethod {
        self.source_method
    }

    /// Strict variant surfacing the typed error.
    pub async fn try_extract(&self, raw_text: &str) -> Result<AlertRecord, AlertError> {
        let request = alert_request(raw_text);
        let response = self.service.infer(SCHEMA_INSTRUCTIONS, &request).await?;
        debug!(backend = self.service.name(), bytes = response.len(), "received model response");
        parse_response(&response, raw_text, self.source_method)
    }

    /// Never fails: errors become a degraded record carrying the message.
    pub async fn extract(&self, raw_text: &str) -> AlertRecord {
        match self.try_extract(raw_text).await {
            Ok(record) => record,
            Err(err) => {
                warn!(backend = self.service.name(), %err, "model extraction degraded");
                AlertRecord::degraded(self.source_method, raw_text, err)
            }
        }
    }
}
