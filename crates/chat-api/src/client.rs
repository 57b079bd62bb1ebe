//! ChatClient implementation over an OpenAI-compatible API.

use reqwest::Client;
use tracing::{debug, info, warn};

use triage_core::{
    async_trait, AssistantTurn, ChatError, ChatMessage, ToolChat, ToolDefinition,
};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse};
use crate::config::ChatApiConfig;

/// A tool-calling chat client.
///
/// Sends the transcript plus the tool schema and returns the assistant's
/// next turn. Each call carries an explicit HTTP timeout; a timeout
/// surfaces as a network error the caller logs and treats as a degraded
/// outcome for the current ticket.
pub struct ChatClient {
    client: Client,
    config: ChatApiConfig,
}

impl ChatClient {
    /// Create a new ChatClient with the given configuration.
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "ChatClient initialized with model: {}, timeout: {}s",
            config.model, config.timeout_secs
        );

        Ok(Self { client, config })
    }

    /// Create a ChatClient from environment variables.
    ///
    /// See [`ChatApiConfig::from_env`] for the variables consumed.
    pub fn from_env() -> Result<Self, ChatError> {
        let config = ChatApiConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    /// Make a chat completion request.
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        tools: Vec<ToolDefinition>,
    ) -> Result<ChatCompletionResponse, ChatError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tool_choice: if tools.is_empty() {
                None
            } else {
                Some("auto".to_string())
            },
            tools: if tools.is_empty() { None } else { Some(tools) },
        };

        debug!("Sending request to chat API: {:?}", request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(ChatError::ProcessingFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(ChatError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::ProcessingFailed(format!("Failed to parse response: {}", e)))?;

        debug!("Received response from chat API: {:?}", completion);

        Ok(completion)
    }
}

#[async_trait]
impl ToolChat for ChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<AssistantTurn, ChatError> {
        let completion = self
            .chat_completion(messages.to_vec(), tools.to_vec())
            .await?;

        // Log usage if available
        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let Some(choice) = completion.choices.into_iter().next() else {
            warn!("No choices in chat API response");
            return Err(ChatError::ProcessingFailed(
                "response contained no choices".to_string(),
            ));
        };

        Ok(AssistantTurn {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
        })
    }

    fn name(&self) -> &str {
        "ChatClient"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_name() {
        let config = ChatApiConfig::builder().api_key("test-key").build();
        let client = ChatClient::new(config).unwrap();
        assert_eq!(client.name(), "ChatClient");
    }

    #[test]
    fn test_config_is_kept() {
        let config = ChatApiConfig::builder()
            .api_key("test-key")
            .model("gpt-test")
            .build();
        let client = ChatClient::new(config).unwrap();
        assert_eq!(client.config().model, "gpt-test");
    }
}
