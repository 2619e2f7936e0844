use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::summary::{build_relay_prompt, system_prompt};
use super::{AdvisoryError, Answer};
use crate::config::{AdvisorMode, Secret};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.7;
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
enum Transport {
    Direct {
        api_key: Option<Secret>,
        model: String,
        base_url: String,
    },
    Relay {
        url: String,
    },
}

/// Sends questions to the configured completion endpoint.
#[derive(Clone)]
pub(crate) struct AdvisoryClient {
    http: reqwest::Client,
    transport: Transport,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: String,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    prompt: &'a str,
}

impl AdvisoryClient {
    pub(crate) fn from_mode(mode: &AdvisorMode) -> Result<Self> {
        match mode {
            AdvisorMode::Direct { api_key, model } => Self::direct_with_base_url(
                api_key.clone(),
                model.clone(),
                ANTHROPIC_API_BASE.to_string(),
            ),
            AdvisorMode::Relay { url } => Self::relay(url.clone()),
        }
    }

    pub(crate) fn direct_with_base_url(
        api_key: Option<Secret>,
        model: String,
        base_url: String,
    ) -> Result<Self> {
        Ok(Self {
            http: build_http()?,
            transport: Transport::Direct {
                api_key,
                model,
                base_url: base_url.trim_end_matches('/').to_string(),
            },
        })
    }

    pub(crate) fn relay(url: String) -> Result<Self> {
        Ok(Self {
            http: build_http()?,
            transport: Transport::Relay { url },
        })
    }

    pub(crate) async fn ask(&self, question: &str, summary: &str) -> Result<Answer, AdvisoryError> {
        match &self.transport {
            Transport::Direct {
                api_key,
                model,
                base_url,
            } => {
                let Some(api_key) = api_key else {
                    return Err(AdvisoryError::Provider(
                        "No API key configured. Set SPENDLENS_ANTHROPIC_KEY or SPENDLENS_ADVISOR_URL."
                            .to_string(),
                    ));
                };
                self.ask_direct(api_key, model, base_url, question, summary).await
            }
            Transport::Relay { url } => self.ask_relay(url, question, summary).await,
        }
    }

    async fn ask_direct(
        &self,
        api_key: &Secret,
        model: &str,
        base_url: &str,
        question: &str,
        summary: &str,
    ) -> Result<Answer, AdvisoryError> {
        let body = MessagesRequest {
            model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: system_prompt(summary),
            messages: [ChatMessage {
                role: "user",
                content: question,
            }],
        };
        let response = self
            .http
            .post(format!("{base_url}/v1/messages"))
            .header("x-api-key", api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let payload = read_payload(response).await?;
        payload
            .as_ref()
            .and_then(message_text)
            .map(Answer)
            .ok_or(AdvisoryError::EmptyResponse)
    }

    async fn ask_relay(
        &self,
        url: &str,
        question: &str,
        summary: &str,
    ) -> Result<Answer, AdvisoryError> {
        let prompt = build_relay_prompt(summary, question);
        let response = self
            .http
            .post(url)
            .json(&RelayRequest { prompt: &prompt })
            .send()
            .await
            .map_err(network_error)?;

        let payload = read_payload(response).await?;
        payload
            .as_ref()
            .and_then(|v| v.get("answer"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Answer(s.to_string()))
            .ok_or(AdvisoryError::EmptyResponse)
    }
}

fn build_http() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(format!("spendlens/{}", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

fn network_error(e: reqwest::Error) -> AdvisoryError {
    if e.is_timeout() {
        return AdvisoryError::Network("request timed out".to_string());
    }
    AdvisoryError::Network(e.without_url().to_string())
}

/// Read the body and sort out error payloads. Returns the parsed JSON (None
/// when the body isn't JSON) for a 2xx without an error field.
async fn read_payload(response: reqwest::Response) -> Result<Option<Value>, AdvisoryError> {
    let status = response.status();
    let text = response.text().await.map_err(network_error)?;
    let payload: Option<Value> = serde_json::from_str(&text).ok();

    if let Some(message) = payload.as_ref().and_then(error_message) {
        return Err(AdvisoryError::Provider(message));
    }
    if !status.is_success() {
        return Err(AdvisoryError::Network(format!("HTTP {status}")));
    }
    Ok(payload)
}

/// `{"error": "..."}` from the relay or `{"error": {"message": "..."}}` from
/// the Messages API.
fn error_message(payload: &Value) -> Option<String> {
    let error = payload.get("error")?;
    let message = match error {
        Value::String(s) => s.as_str(),
        Value::Object(_) => error.get("message")?.as_str()?,
        _ => return None,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

fn message_text(payload: &Value) -> Option<String> {
    let text: String = payload
        .get("content")?
        .as_array()?
        .iter()
        // untyped blocks with a text field are read as text
        .filter(|block| {
            block
                .get("type")
                .map_or(true, |kind| kind.as_str() == Some("text"))
        })
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
