use super::LlmClient;
use crate::error::LlmError;
use async_trait::async_trait;
use openai_api_rs::v1::api::OpenAIClient;
use openai_api_rs::v1::chat_completion::{self, ChatCompletionRequest};

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI チャット補完
pub struct OpenAiClient {
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: Option<String>, max_tokens: u32) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
        }
    }

    fn request(&self, prompt: &str) -> ChatCompletionRequest {
        let mut req = ChatCompletionRequest::new(
            self.model.clone(),
            vec![chat_completion::ChatCompletionMessage {
                role: chat_completion::MessageRole::user,
                content: chat_completion::Content::Text(String::from(prompt)),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            }],
        );
        req.max_tokens = Some(i64::from(self.max_tokens));
        req
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let mut client = OpenAIClient::builder()
            .with_api_key(self.api_key.clone())
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let response = client
            .chat_completion(self.request(prompt))
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}
