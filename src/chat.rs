//! Chat-completion client (Groq, OpenAI-compatible API)

use crate::config::GroqConfig;
use crate::{Result, WeatherWearError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

/// Client for `POST {base_url}/chat/completions`
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatClient {
    /// Build a client, or `None` when no API key is configured
    pub fn from_config(config: &GroqConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone().filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("WeatherWear/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherWearError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        }))
    }

    /// Send a single user-role prompt and return the reply text
    #[instrument(skip(self, prompt))]
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let start_time = Instant::now();
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Chat completion failed with status {}: {}", status, body);
            return Err(WeatherWearError::api(format!(
                "Chat completion failed with status {status}"
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| WeatherWearError::api("Chat completion returned no content"))?;

        info!(
            "Chat completion from {} in {:.3}s",
            model,
            start_time.elapsed().as_secs_f64()
        );
        Ok(content)
    }
}
