//! Gemini client (Google Generative Language API).

use super::{GenerationError, TextGenerator};
use crate::config::GenerationSettings;
use crate::error::{Result, SprigError};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};

pub struct GeminiClient {
    api_key: HeaderValue,
    base_url: String,
    model: String,
    http: reqwest::blocking::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Build a client from settings, reading the key from `settings.api_key_env`.
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                SprigError::Config(format!(
                    "{} is not set. Set it to use the generation API.",
                    settings.api_key_env
                ))
            })?;
        Self::new(api_key, settings)
    }

    pub fn new(api_key: String, settings: &GenerationSettings) -> Result<Self> {
        url::Url::parse(&settings.base_url).map_err(|e| {
            SprigError::Config(format!("Invalid base URL '{}': {}", settings.base_url, e))
        })?;
        let mut api_key = HeaderValue::from_str(&api_key).map_err(|_| {
            SprigError::Config(format!(
                "API key from {} is not a valid header value",
                settings.api_key_env
            ))
        })?;
        api_key.set_sensitive(true);
        Ok(Self {
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            http: crate::http::blocking_client(settings.timeout())?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", self.api_key.clone());
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Calling generation API");

        let response = self
            .http
            .post(self.endpoint())
            .headers(self.headers())
            .json(&build_request(prompt))
            .send()
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        let body = response.text().map_err(classify_reqwest_error)?;
        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Other(format!("Invalid response JSON: {}", e)))?;
        extract_text(&value)
    }
}

fn build_request(prompt: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{"text": prompt}]
        }]
    })
}

fn is_rate_limit_message(text: &str) -> bool {
    let lowered = text.to_lowercase();
    lowered.contains("quota") || lowered.contains("rate limit")
}

fn classify_status(status: StatusCode, body: &str) -> GenerationError {
    let message = format!("HTTP {}: {}", status.as_u16(), body.trim());
    if status == StatusCode::TOO_MANY_REQUESTS || is_rate_limit_message(body) {
        GenerationError::RateLimited(message)
    } else {
        GenerationError::Other(message)
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Other(format!("Request timed out: {}", e))
    } else if e.is_connect() {
        GenerationError::Other(format!("Connection failed: {}", e))
    } else if e.is_request() {
        GenerationError::Other(format!("Request error: {}", e))
    } else {
        GenerationError::Other(format!("Network error: {}", e))
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(value: &Value) -> std::result::Result<String, GenerationError> {
    let candidate = value
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .ok_or_else(|| {
            let reason = value
                .pointer("/promptFeedback/blockReason")
                .and_then(Value::as_str)
                .unwrap_or("no candidates returned");
            GenerationError::Other(format!("Empty response: {}", reason))
        })?;

    let text: String = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let finish = candidate
            .get("finishReason")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Err(GenerationError::Other(format!(
            "Response contained no text (finish reason: {})",
            finish
        )));
    }
    Ok(text)
}
