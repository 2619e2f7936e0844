use serde::Serialize;
use serde_json::Value;

const MAX_OUTPUT_TOKENS: u32 = 500;
const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Serialize)]
pub(super) struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f64,
}

impl<'a> GenerateRequest<'a> {
    pub(super) fn new(prompt: &'a str) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
                temperature: TEMPERATURE,
            },
        }
    }
}

/// `{"error": {"message": ...}}`
pub(super) fn error_message(payload: &Value) -> Option<String> {
    let message = payload.get("error")?.get("message")?.as_str()?.trim();
    (!message.is_empty()).then(|| message.to_string())
}

/// Text of the first candidate, all parts joined.
pub(super) fn answer_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
