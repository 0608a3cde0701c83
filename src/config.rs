use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::ErrorKind;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

/// 利用するLLMプロバイダ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    OpenAi,
    Anthropic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// 未指定ならプロバイダごとの既定モデル
    pub model: Option<String>,
    /// 未指定なら環境変数から読む
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            model: None,
            api_key: None,
            timeout_secs: 5,
            max_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AffiliateConfig {
    pub timeout_secs: u64,
    pub product_limit: usize,
    pub product_type: String,
}

impl Default for AffiliateConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            product_limit: 3,
            product_type: "의류".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub affiliate: AffiliateConfig,
}

impl AppConfig {
    /// config.ymlを読み込む
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let config: AppConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// ファイルが無ければ既定値で起動する（パースエラーは返す）
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Ok(config) => {
                info!("[Config] {} を読み込みました", path);
                Ok(config)
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                warn!("[Config] {} が見つからないため既定値を使用します", path);
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    pub fn affiliate_timeout(&self) -> Duration {
        Duration::from_secs(self.affiliate.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "llm:\n  provider: openai\n  timeout_secs: 8\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm_timeout(), Duration::from_secs(8));
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.affiliate.product_limit, 3);
        assert_eq!(config.affiliate.product_type, "의류");
    }

    #[test]
    fn unknown_provider_is_a_parse_error() {
        let yaml = "llm:\n  provider: llama\n";
        assert!(serde_yaml::from_str::<AppConfig>(yaml).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_or_default("/nonexistent/fortune-config.yml").unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert_eq!(config.llm_timeout(), Duration::from_secs(5));
        assert_eq!(config.affiliate_timeout(), Duration::from_secs(5));
    }
}
