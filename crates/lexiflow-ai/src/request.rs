//! Wire types for the `generateContent` call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::encoder::EncodedDocument;

// ── Prompt ──

pub const INSTRUCTION: &str = "\
You are an expert Senior Legal Analyst and OCR specialist.
1. Perform precise text extraction from this document (OCR if image/PDF).
2. Analyze the content for legal risks, obligations, and missing standard clauses.
3. Create a structured checklist of next steps for a lawyer handling this document.

Think deeply about the implications of specific wordings before generating the JSON.";

const RESPONSE_MIME: &str = "application/json";

// ── Request ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest<'a> {
    pub contents: Vec<Content<'a>>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part<'a> {
    #[serde(rename_all = "camelCase")]
    InlineData { mime_type: &'a str, data: &'a str },
    Text(&'a str),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: &'static str,
    pub response_schema: Value,
    pub thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: u32,
}

/// Document first, then the instruction, with the response contract attached.
pub fn build_request(doc: &EncodedDocument, thinking_budget: u32) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    mime_type: &doc.mime,
                    data: &doc.data,
                },
                Part::Text(INSTRUCTION),
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME,
            response_schema: lexiflow_core::response_schema(),
            thinking_config: ThinkingConfig { thinking_budget },
        },
    }
}

// ── Response ──

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    /// Set on reasoning summaries, which are not part of the answer.
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Answer text of the first candidate, `None` when there is none.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_bytes;

    #[test]
    fn request_body_shape() {
        let doc = encode_bytes("image/png", b"png-bytes");
        let body = serde_json::to_value(build_request(&doc, 32768)).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], doc.data.as_str());
        assert!(parts[1]["text"].as_str().unwrap().contains("OCR specialist"));

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["thinkingConfig"]["thinkingBudget"], 32768);
        assert_eq!(config["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn text_skips_thought_parts() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"considering clauses","thought":true},
                {"text":"{\"a\":"},
                {"text":"1}"}
            ]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn no_candidates_is_none() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#,
        )
        .unwrap();
        assert_eq!(resp.text(), None);
        assert_eq!(resp.block_reason(), Some("SAFETY"));
    }

    #[test]
    fn blank_text_is_none() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)
                .unwrap();
        assert_eq!(resp.text(), None);
    }
}
