//! Analysis client for the generative-AI service.
//!
//! One request per document, no retry. The whole call is bounded by
//! [`AnalysisConfig::timeout`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use lexiflow_core::{DocumentAnalysis, SourceFile};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::encoder::{EncodedDocument, encode_file};
use crate::error::{AnalysisError, MalformedResponse};
use crate::request::{GenerateResponse, build_request};

const USER_AGENT: &str = concat!("lexiflow/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns an uploaded document into a [`DocumentAnalysis`].
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, file: &SourceFile) -> Result<DocumentAnalysis, AnalysisError>;
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    config: AnalysisConfig,
}

impl GeminiClient {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    async fn generate(
        &self,
        api_key: &str,
        doc: &EncodedDocument,
    ) -> Result<String, AnalysisError> {
        let url = self.config.generate_url();
        let body = build_request(doc, self.config.thinking_budget);

        info!(url = %url, mime = %doc.mime, payload_bytes = doc.data.len(), "requesting analysis");
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        if let Some(reason) = parsed.block_reason() {
            warn!(reason, "analysis request was blocked");
        }
        if let Some(finish) = parsed
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            debug!(finish_reason = finish, "candidate finished");
        }
        parsed.text().ok_or(AnalysisError::EmptyResponse)
    }
}

#[async_trait]
impl Analyzer for GeminiClient {
    async fn analyze(&self, file: &SourceFile) -> Result<DocumentAnalysis, AnalysisError> {
        // Checked before touching the file or the network.
        let api_key = self
            .config
            .resolve_api_key()
            .ok_or(AnalysisError::MissingApiKey)?;

        let doc = encode_file(file).await?;
        let started = Instant::now();
        let text = tokio::time::timeout(self.config.timeout, self.generate(&api_key, &doc))
            .await
            .map_err(|_| AnalysisError::Timeout(self.config.timeout))??;

        let analysis = parse_analysis(&text)?;
        info!(
            document_type = %analysis.document_type,
            risks = analysis.risks.len(),
            checklist = analysis.checklist.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );
        Ok(analysis)
    }
}

/// Parse the service's answer text into a [`DocumentAnalysis`].
///
/// The text must be a JSON document that satisfies the response contract.
/// Checklist items always start uncompleted, whatever the service said.
pub fn parse_analysis(text: &str) -> Result<DocumentAnalysis, AnalysisError> {
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }
    let value: Value = serde_json::from_str(text).map_err(MalformedResponse::from)?;
    lexiflow_core::validate(&value).map_err(MalformedResponse::from)?;
    let mut analysis: DocumentAnalysis =
        serde_json::from_value(value).map_err(MalformedResponse::from)?;

    for item in analysis.checklist.iter_mut().filter(|i| i.is_completed) {
        debug!(id = %item.id, "checklist item arrived completed; clearing");
        item.is_completed = false;
    }
    Ok(analysis)
}
