use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::{CompletionRequest, LlmError, LlmProvider, LlmResult};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI chat-completions provider.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// Create a provider with the given API key and model.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    async fn complete_inner(&self, request: CompletionRequest) -> LlmResult<String> {
        let payload = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let send = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send();

        let response = tokio::time::timeout(request.timeout, send)
            .await
            .map_err(|_| LlmError::Timeout(request.timeout))?
            .map_err(|err| LlmError::Api(err.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::Api(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| LlmError::Parse(err.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Parse("no choices in response".to_string()))?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(LlmError::Parse("empty completion".to_string()));
        }

        Ok(trimmed.to_string())
    }
}

impl LlmProvider for OpenAiProvider {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'static, LlmResult<String>> {
        let provider = self.clone();
        Box::pin(async move { provider.complete_inner(request).await })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}
