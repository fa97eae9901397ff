use async_trait::async_trait;
use relance_core::{BackendError, GenerativeBackend};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use crate::retry::{RetryPolicy, retry_with_backoff_when};

/// Longest error body kept in a `BackendError::Status`.
const MAX_ERROR_BODY: usize = 300;

/// Google Gemini `generateContent` client.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiProvider {
    /// `request_timeout` bounds each HTTP attempt; retries come on top of it.
    pub fn new(
        api_key: String,
        model: String,
        request_timeout: Duration,
    ) -> Result<Self, BackendError> {
        info!("Creating GeminiProvider for model {model}");
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model,
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ]
        })
    }

    /// Concatenate the text parts of the first candidate.
    fn parse_response(response: &Value) -> Result<String, BackendError> {
        let Some(candidate) = response["candidates"].get(0) else {
            let reason = response["promptFeedback"]["blockReason"]
                .as_str()
                .map_or_else(
                    || "missing candidates".to_string(),
                    |r| format!("prompt blocked: {r}"),
                );
            return Err(BackendError::InvalidResponse(reason));
        };

        let parts = candidate["content"]["parts"].as_array().ok_or_else(|| {
            BackendError::InvalidResponse("missing content parts".to_string())
        })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(text.trim().to_string())
    }

    /// Rate limits, server errors and network failures are worth another try.
    const fn is_transient(err: &BackendError) -> bool {
        match err {
            BackendError::Request(_) | BackendError::Timeout(_) => true,
            BackendError::Status { status, .. } => *status == 429 || *status >= 500,
            BackendError::InvalidResponse(_) | BackendError::EmptyResponse => false,
        }
    }

    async fn try_send(&self, body: &Value) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        Self::parse_response(&value)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let body = Self::request_body(prompt);
        debug!(
            "Sending request to Gemini API: model={}, prompt_len={}",
            self.model,
            prompt.len()
        );

        let text =
            retry_with_backoff_when(|| self.try_send(&body), &self.retry, Self::is_transient)
                .await?;

        debug!("Received response from Gemini API ({} chars)", text.len());
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_wraps_prompt_as_single_user_part() {
        let body = GeminiProvider::request_body("Say OK");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Say OK");
    }

    #[test]
    fn parses_and_joins_candidate_parts() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [ { "text": "Hello, " }, { "text": "how can I help?\n" } ] }
            }]
        });
        assert_eq!(
            GeminiProvider::parse_response(&response).unwrap(),
            "Hello, how can I help?"
        );
    }

    #[test]
    fn blocked_prompt_is_reported() {
        let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = GeminiProvider::parse_response(&response).unwrap_err();
        assert!(err.to_string().contains("prompt blocked: SAFETY"));
    }

    #[test]
    fn blank_text_is_empty_response() {
        let response = json!({ "candidates": [{ "content": { "parts": [ { "text": "  " } ] } }] });
        assert!(matches!(
            GeminiProvider::parse_response(&response),
            Err(BackendError::EmptyResponse)
        ));
    }

    #[test]
    fn only_transient_errors_retry() {
        assert!(GeminiProvider::is_transient(&BackendError::Status {
            status: 503,
            body: String::new()
        }));
        assert!(GeminiProvider::is_transient(&BackendError::Status {
            status: 429,
            body: String::new()
        }));
        assert!(!GeminiProvider::is_transient(&BackendError::Status {
            status: 400,
            body: String::new()
        }));
        assert!(!GeminiProvider::is_transient(&BackendError::EmptyResponse));
    }

    #[test]
    fn endpoint_includes_model() {
        let provider = GeminiProvider::new(
            "key".to_string(),
            "gemini-1.5-flash".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url("http://localhost:9999/v1beta/".to_string());
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(provider.model(), "gemini-1.5-flash");
    }
}
