use thiserror::Error;

/// LLM呼び出しの失敗
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key is not set ({0})")]
    MissingApiKey(&'static str),

    #[error("LLM request failed: {0}")]
    Transport(String),

    #[error("LLM provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("LLM response had no text content")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Transport(e.to_string())
    }
}

/// テンプレート運勢生成の失敗
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("fortune table is empty: {0}")]
    EmptyTable(&'static str),

    #[error("failed to render fortune text")]
    Render(#[from] std::fmt::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// HTTP境界で返すエラー
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("모든 정보를 입력해주세요.")]
    MissingFields,

    #[error("올바른 날짜 형식이 아닙니다.")]
    InvalidDate,

    #[error("오류가 발생했습니다: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> axum::http::StatusCode {
        match self {
            ApiError::MissingFields | ApiError::InvalidDate => axum::http::StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = axum::Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
