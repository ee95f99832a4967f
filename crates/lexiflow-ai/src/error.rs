use std::time::Duration;

use lexiflow_core::SchemaError;
use thiserror::Error;

use crate::encoder::EncodeError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("API key is missing: set API_KEY or GEMINI_API_KEY")]
    MissingApiKey,

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("no response from the analysis service within {0:?}")]
    Timeout(Duration),

    #[error("analysis service returned no text")]
    EmptyResponse,

    #[error("malformed analysis response: {0}")]
    Malformed(#[from] MalformedResponse),
}

#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Coarse classification of [`AnalysisError`] for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Encoding,
    Service,
    EmptyResponse,
    MalformedResponse,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Encoding => "encoding",
            Self::Service => "service",
            Self::EmptyResponse => "empty-response",
            Self::MalformedResponse => "malformed-response",
        }
    }
}

impl AnalysisError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingApiKey => ErrorCategory::Configuration,
            Self::Encode(_) => ErrorCategory::Encoding,
            Self::Http(_) | Self::Server { .. } | Self::Timeout(_) => ErrorCategory::Service,
            Self::EmptyResponse => ErrorCategory::EmptyResponse,
            Self::Malformed(_) => ErrorCategory::MalformedResponse,
        }
    }
}
