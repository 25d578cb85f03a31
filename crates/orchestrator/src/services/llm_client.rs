//! Chat-completion client for the capability providers.
//!
//! Speaks the OpenAI-compatible `/chat/completions` dialect so any of the
//! usual backends (Ollama, Groq, OpenAI) can serve the roles; the endpoint
//! and model come from configuration.

use std::time::Duration;

use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::error::{OrchestratorError, Result};

const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
const DEFAULT_MODEL: &str = "llama3-8b-8192";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API, without the trailing
    /// `/chat/completions`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatTurn,
}

#[derive(Deserialize)]
struct ChatTurn {
    content: String,
}

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self { http, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, system: Option<&str>, user: &str, stream: bool) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": user}));

        json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "stream": stream,
        })
    }

    async fn send(&self, body: &serde_json::Value) -> Result<reqwest::Response> {
        let mut request = self.http.post(self.completions_url()).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OrchestratorError::Provider(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Provider returned an error");
            return Err(OrchestratorError::Provider(format!(
                "provider returned {status}: {body}"
            )));
        }
        Ok(response)
    }

    /// One blocking completion; returns the first choice's content.
    pub async fn chat(&self, system: Option<&str>, user: &str) -> Result<String> {
        let body = self.request_body(system, user, false);
        let response = self.send(&body).await?;

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| OrchestratorError::MalformedResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                OrchestratorError::MalformedResponse("completion had no choices".to_string())
            })
    }

    /// Streaming completion: yields content deltas as they arrive over SSE.
    pub async fn chat_stream(
        &self,
        system: Option<&str>,
        user: &str,
    ) -> Result<impl Stream<Item = Result<String>> + Send> {
        let body = self.request_body(system, user, true);
        let response = self.send(&body).await?;

        let stream = response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| async move {
                match event {
                    Ok(event) => {
                        if event.data.trim() == "[DONE]" {
                            return None;
                        }
                        match serde_json::from_str::<StreamChunk>(&event.data) {
                            Ok(chunk) => chunk
                                .choices
                                .into_iter()
                                .next()
                                .and_then(|choice| choice.delta.content)
                                .map(Ok),
                            Err(e) => {
                                Some(Err(OrchestratorError::MalformedResponse(e.to_string())))
                            }
                        }
                    }
                    Err(e) => Some(Err(OrchestratorError::Provider(e.to_string()))),
                }
            });

        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LlmClient {
        LlmClient::new(LlmConfig {
            base_url: server.uri(),
            ..LlmConfig::default()
        })
    }

    #[tokio::test]
    async fn test_chat_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hello there"}}]
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server).chat(Some("be brief"), "hi").await.unwrap();
        assert_eq!(reply, "hello there");
    }

    #[tokio::test]
    async fn test_chat_maps_http_errors_to_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let error = client_for(&server).chat(None, "hi").await.unwrap_err();
        assert!(matches!(error, OrchestratorError::Provider(_)));
        assert!(error.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let error = client_for(&server).chat(None, "hi").await.unwrap_err();
        assert!(matches!(error, OrchestratorError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_stream_concatenates_deltas() {
        let server = MockServer::start().await;
        let sse_body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body),
            )
            .mount(&server)
            .await;

        let stream = client_for(&server).chat_stream(None, "hi").await.unwrap();
        let chunks: Vec<String> = stream
            .filter_map(|chunk| async move { chunk.ok() })
            .collect()
            .await;
        assert_eq!(chunks.join(""), "Hello");
    }
}
