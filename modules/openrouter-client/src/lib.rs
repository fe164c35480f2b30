pub mod types;
pub mod util;

pub use util::{first_json_object, strip_code_blocks};

use std::time::Duration;

use anyhow::{anyhow, Result};
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use types::*;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// Hard wall-clock bound on a single completion request. A slow model is
/// treated as a failed source, never retried.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OpenRouterClient {
    api_key: String,
    http: reqwest::Client,
    app_name: Option<String>,
}

impl OpenRouterClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            app_name: None,
        }
    }

    pub fn with_app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref name) = self.app_name {
            if let Ok(val) = HeaderValue::from_str(name) {
                headers.insert("X-Title", val);
            }
        }

        Ok(headers)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{OPENROUTER_API_URL}/chat/completions");

        debug!(model = %request.model, "OpenRouter chat request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("OpenRouter API error ({}): {}", status, error_text));
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("No response from OpenRouter"))
    }

    /// Single system+user exchange, deterministic settings.
    pub async fn chat_completion(&self, model: &str, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![WireMessage::system(system), WireMessage::user(user)],
            temperature: Some(0.0),
            max_tokens: Some(1024),
        };
        self.chat(&request).await
    }

    /// Send a base64-encoded image to a vision model and return the raw
    /// text response.
    pub async fn vision_completion(
        &self,
        model: &str,
        prompt: &str,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let data_uri = format!("data:{mime_type};base64,{encoded}");

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![WireMessage::user_with_image(data_uri, prompt)],
            temperature: Some(0.0),
            max_tokens: Some(1024),
        };
        self.chat(&request).await
    }
}
