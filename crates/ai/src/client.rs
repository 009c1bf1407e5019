//! REST client for the generative-language backend.

use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{GenerationError, Result};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MODEL: &str = "gemini-3-flash-preview";
const MAX_LOG_BODY_CHARS: usize = 512;

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Client for the `generateContent` endpoint.
///
/// One request per generation; no retries and no timeout beyond the
/// transport default. A thrown backend error propagates to the caller as a
/// generic failure the UI can surface for manual retry.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a non-default endpoint, mainly for tests.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Run one generation and return the raw text, `""` when the backend
    /// returns nothing usable.
    ///
    /// `response_schema`, when supplied, constrains the backend to a JSON
    /// response of that shape.
    pub async fn generate_content(
        &self,
        api_key: &str,
        system_instruction: &str,
        prompt: &str,
        response_schema: Option<Value>,
    ) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, MODEL
        );

        let mut body = json!({
            "systemInstruction": { "parts": [{ "text": system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });
        if let Some(schema) = response_schema {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema
            });
        }

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if status.is_success() {
            debug!("Generation response status: {}", status);
            let parsed: GenerateContentResponse = serde_json::from_str(&raw).unwrap_or_default();
            return Ok(extract_text(parsed));
        }

        let mut preview = raw.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if raw.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("Generation response error ({}): {}", status, preview);

        if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(&raw) {
            return Err(GenerationError::api(
                status.as_u16(),
                format!("{}: {}", envelope.error.status, envelope.error.message),
            ));
        }
        Err(GenerationError::api(
            status.as_u16(),
            format!("Request failed: {}", raw),
        ))
    }
}

/// Join every part of the first candidate; empty string when absent.
fn extract_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}
