//! Gemini `generateContent` client.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use pathreplay_common::config::EstimatorConfig;
use pathreplay_common::error::{PathreplayError, PathreplayResult};
use serde_json::{json, Value};

use crate::VisionClient;

/// Vision client backed by the Gemini REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a client from configuration, reading the API key from the
    /// environment. A missing key is a startup error.
    pub fn from_config(config: &EstimatorConfig) -> PathreplayResult<Self> {
        let api_key = config.api_key()?;
        Ok(Self::new(&config.endpoint, &config.model, api_key))
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// Request body carrying the prompt and one inline PNG.
pub fn request_body(png: &[u8], prompt: &str) -> Value {
    json!({
        "contents": [
            {
                "parts": [
                    { "text": prompt },
                    {
                        "inline_data": {
                            "mime_type": "image/png",
                            "data": general_purpose::STANDARD.encode(png)
                        }
                    }
                ]
            }
        ]
    })
}

/// First text part of the first candidate.
pub fn response_text(body: &Value) -> Option<String> {
    body.get("candidates")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.get("parts"))
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("text"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[async_trait]
impl VisionClient for GeminiClient {
    async fn query(&self, png: &[u8], prompt: &str) -> PathreplayResult<String> {
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(png, prompt))
            .send()
            .await
            .map_err(|e| PathreplayError::estimator(format!("Gemini request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PathreplayError::estimator(format!(
                "Gemini API error {status}: {error_text}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PathreplayError::estimator(format!("Invalid Gemini response: {e}")))?;

        response_text(&body)
            .ok_or_else(|| PathreplayError::estimator("No text part in Gemini response"))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_endpoint_and_model() {
        let client = GeminiClient::new("https://example.test/v1beta/", "gemini-1.5-flash", "k");
        assert_eq!(
            client.url(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn body_inlines_base64_png() {
        let body = request_body(b"png", "find it");
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "find it");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], "cG5n");
    }

    #[test]
    fn extracts_first_candidate_text() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "640,360" } ] } }
            ]
        });
        assert_eq!(response_text(&body).as_deref(), Some("640,360"));
        assert_eq!(response_text(&json!({ "candidates": [] })), None);
    }
}
