//! Analysis client configuration.

use std::fmt;
use std::time::Duration;

/// Environment variables consulted for the credential, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY"];

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Largest reasoning budget the service accepts; legal reading gets all of it.
pub const MAX_THINKING_BUDGET: u32 = 32768;

#[derive(Clone)]
pub struct AnalysisConfig {
    /// Explicit credential. Takes precedence over the environment.
    pub api_key: Option<String>,
    /// Environment variables checked at call time when `api_key` is unset.
    pub api_key_env: Vec<String>,
    pub model: String,
    /// Base URL without trailing slash, e.g. `https://host/v1beta`.
    pub endpoint: String,
    /// Upper bound on one whole analysis call.
    pub timeout: Duration,
    pub thinking_budget: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: API_KEY_ENV_VARS.iter().map(|s| s.to_string()).collect(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            thinking_budget: MAX_THINKING_BUDGET,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("thinking_budget", &self.thinking_budget)
            .finish()
    }
}

impl AnalysisConfig {
    /// Resolve the credential from the process environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the credential with a custom variable lookup. Blank values
    /// count as absent.
    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key
            .iter()
            .cloned()
            .chain(self.api_key_env.iter().filter_map(|name| lookup(name)))
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }

    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}
