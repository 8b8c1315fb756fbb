//! OpenAI-compatible inference client.
//!
//! Sends non-streaming chat completion requests to the configured endpoint
//! and parses the reply into text and tool calls. Primary mode treats every
//! call as blocking: the request either completes within the client timeout
//! or surfaces an error for the analyst to recover from.

use std::time::Duration;

use reqwest::Client as HttpClient;

use super::config::AgentConfig;
use super::errors::InferenceError;
use super::types::{
    parse_completion_response, ChatCompletionRequest, ChatMessage, CompletionTurn, ToolDefinition,
};

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request timeout. Tool-calling turns on hosted endpoints complete
/// well inside this; local backends with cold models need the headroom.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the chat-completions endpoint.
///
/// Construction validates nothing beyond the HTTP client itself — endpoint
/// reachability and credential validity surface on the first request.
pub struct InferenceClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl InferenceClient {
    /// Create a client from the agent config and a resolved credential.
    pub fn new(config: &AgentConfig, api_key: String) -> Result<Self, InferenceError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InferenceError::ConnectionFailed {
                endpoint: config.base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// The model name this client sends.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat-completion request and parse the model's turn.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<CompletionTurn, InferenceError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            tool_choice: tools.as_ref().map(|_| "auto".to_string()),
            tools,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::ConnectionFailed {
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::ResponseParseError {
                reason: format!("failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(InferenceError::HttpError {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_completion_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AgentConfig {
        AgentConfig {
            base_url: "http://127.0.0.1:1/v1/".to_string(),
            ..AgentConfig::default()
        }
    }

    #[test]
    fn new_strips_trailing_slash() {
        let client = InferenceClient::new(&test_config(), "sk-test".into()).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:1/v1");
        assert_eq!(client.model(), "gpt-4o");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_connection_error() {
        // Port 1 refuses connections; the error must be typed, not a panic.
        let client = InferenceClient::new(&test_config(), "sk-test".into()).unwrap();
        let err = client
            .chat_completion(vec![ChatMessage::user("hello")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::ConnectionFailed { .. }));
    }
}
