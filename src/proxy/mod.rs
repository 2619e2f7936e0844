mod gemini;
mod server;

pub(crate) use server::run_server;

use anyhow::{Context, Result};
use std::time::Duration;

use crate::config::Secret;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub(crate) enum ProxyError {
    #[error("no provider credential configured")]
    Configuration,
    #[error("network error: {0}")]
    Network(String),
    #[error("provider error: {0}")]
    Provider(String),
    /// The provider answered 2xx without any text. `raw` is kept for
    /// debugging and never sent back to the caller.
    #[error("empty response from provider")]
    EmptyResponse { raw: String },
}

impl ProxyError {
    /// Message returned to relay clients in the `error` field.
    pub(crate) fn public_message(&self) -> String {
        match self {
            ProxyError::Configuration => "Server is missing its Gemini API key".to_string(),
            ProxyError::Network(_) => "Gemini API failed".to_string(),
            ProxyError::Provider(message) => message.clone(),
            ProxyError::EmptyResponse { .. } => "No response from Gemini.".to_string(),
        }
    }
}

/// Forwards prompts to Gemini using a credential only the server knows.
pub(crate) struct ProxyHandler {
    http: reqwest::Client,
    api_key: Option<Secret>,
    model: String,
    base_url: String,
}

impl ProxyHandler {
    pub(crate) fn new(api_key: Option<Secret>, model: String) -> Result<Self> {
        Self::with_base_url(api_key, model, GEMINI_API_BASE.to_string())
    }

    pub(crate) fn with_base_url(
        api_key: Option<Secret>,
        model: String,
        base_url: String,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("spendlens-relay/{}", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) async fn handle(&self, prompt: &str) -> Result<String, ProxyError> {
        let api_key = self.api_key.as_ref().ok_or(ProxyError::Configuration)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .http
            .post(url)
            .query(&[("key", api_key.expose())])
            .json(&gemini::GenerateRequest::new(prompt))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let raw = response.text().await.map_err(network_error)?;
        let payload: Option<serde_json::Value> = serde_json::from_str(&raw).ok();

        if let Some(message) = payload.as_ref().and_then(gemini::error_message) {
            return Err(ProxyError::Provider(message));
        }
        if !status.is_success() {
            return Err(ProxyError::Network(format!("HTTP {status}")));
        }
        match payload.as_ref().and_then(gemini::answer_text) {
            Some(text) => Ok(text),
            None => {
                tracing::debug!(raw = %raw, "provider returned no text");
                Err(ProxyError::EmptyResponse { raw })
            }
        }
    }
}

/// The request URL carries the key, so it is stripped before formatting.
fn network_error(e: reqwest::Error) -> ProxyError {
    if e.is_timeout() {
        return ProxyError::Network("request timed out".to_string());
    }
    ProxyError::Network(e.without_url().to_string())
}
