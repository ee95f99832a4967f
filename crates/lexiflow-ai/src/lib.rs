//! AI analysis layer: document encoding and the generative-AI client.

pub mod client;
pub mod config;
pub mod encoder;
mod error;
pub mod request;

pub use client::{Analyzer, GeminiClient, parse_analysis};
pub use config::AnalysisConfig;
pub use encoder::{EncodeError, EncodedDocument, encode_bytes, encode_file};
pub use error::{AnalysisError, ErrorCategory, MalformedResponse};
