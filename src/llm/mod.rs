mod anthropic;
mod gemini;
mod openai;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::LlmError;
use async_trait::async_trait;
use std::env;
use std::sync::Arc;

/// 本文にこれが含まれていたら失敗応答
pub const FAILURE_MARKER: &str = "오류 발생:";

/// プロンプト1本を送ってテキストを受け取るだけのLLMクライアント。リトライはしない
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// 設定からクライアントを作る。APIキーが無ければここで失敗する
pub fn build_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let model = config.model.clone();
    let explicit_key = config.api_key.as_deref();
    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(
            resolve_api_key(explicit_key, "GOOGLE_API_KEY")?,
            model,
            config.max_tokens,
        )),
        LlmProvider::OpenAi => Arc::new(OpenAiClient::new(
            resolve_api_key(explicit_key, "OPENAI_API_KEY")?,
            model,
            config.max_tokens,
        )),
        LlmProvider::Anthropic => Arc::new(AnthropicClient::new(
            resolve_api_key(explicit_key, "ANTHROPIC_API_KEY")?,
            model,
            config.max_tokens,
        )),
    };
    Ok(client)
}

/// 明示指定を優先、なければ環境変数
fn resolve_api_key(explicit: Option<&str>, var: &'static str) -> Result<String, LlmError> {
    explicit
        .map(str::to_string)
        .or_else(|| env::var(var).ok())
        .filter(|key| !key.trim().is_empty())
        .ok_or(LlmError::MissingApiKey(var))
}

/// 非2xxレスポンスをエラーに変換
async fn provider_error(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    LlmError::Provider { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_wins() {
        let key = resolve_api_key(Some("abc"), "FORTUNE_TEST_UNSET_KEY").unwrap();
        assert_eq!(key, "abc");
    }

    #[test]
    fn missing_key_is_a_construction_error() {
        let err = resolve_api_key(None, "FORTUNE_TEST_UNSET_KEY").unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey("FORTUNE_TEST_UNSET_KEY")));

        let err = resolve_api_key(Some("  "), "FORTUNE_TEST_UNSET_KEY").unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey(_)));
    }

    #[test]
    fn builds_each_provider_with_explicit_key() {
        for (provider, name) in [
            (LlmProvider::Gemini, "gemini"),
            (LlmProvider::OpenAi, "openai"),
            (LlmProvider::Anthropic, "anthropic"),
        ] {
            let config = LlmConfig {
                provider,
                api_key: Some("test-key".to_string()),
                ..LlmConfig::default()
            };
            let client = build_client(&config).unwrap();
            assert_eq!(client.name(), name);
        }
    }
}
