use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::fortune::{FortuneRequest, FortuneResult, FortuneService};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// ハンドラ間で共有する状態
#[derive(Clone)]
pub struct AppState {
    pub fortune: Arc<FortuneService>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/get_fortune", post(get_fortune_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// APIサーバーを起動
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("[Server] 🔮 listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 文字列フィールドを取り出す。欠落・非文字列・空文字は None
fn text_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// 日付の前後に空白があれば不正とする
fn parse_birth_date(raw: &str) -> Result<NaiveDate, ApiError> {
    if raw.trim() != raw {
        return Err(ApiError::InvalidDate);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ApiError::InvalidDate)
}

/// リクエストJSONを検証して FortuneRequest にする。trimするのは名前だけ
pub fn parse_request(body: &Value) -> Result<FortuneRequest, ApiError> {
    let name = text_field(body, "name").map(str::trim).filter(|s| !s.is_empty());
    let birth_date = text_field(body, "birth_date");
    let gender = text_field(body, "gender");

    let (Some(name), Some(birth_date), Some(gender)) = (name, birth_date, gender) else {
        return Err(ApiError::MissingFields);
    };

    let birth_date = parse_birth_date(birth_date)?;

    Ok(FortuneRequest {
        name: name.to_string(),
        birth_date,
        gender: gender.to_string(),
    })
}

async fn get_fortune_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<FortuneResult>, ApiError> {
    let Json(body) = payload.map_err(|e| {
        warn!("[Server] JSONを解釈できません: {}", e);
        ApiError::MissingFields
    })?;
    let request = parse_request(&body)?;
    info!("[Server] 運勢リクエスト: {} ({})", request.name, request.birth_date);

    // サービス内部のpanicは500として返す
    let fortune = Arc::clone(&state.fortune);
    let result = tokio::spawn(async move { fortune.tell(&request).await })
        .await
        .map_err(|e| {
            error!("[Server] 運勢生成タスク失敗: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    Ok(Json(result))
}

async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_request_is_trimmed() {
        let request = parse_request(&json!({
            "name": "  Kim ",
            "birth_date": "1990-05-04",
            "gender": "F",
        }))
        .unwrap();
        assert_eq!(request.name, "Kim");
        assert_eq!(request.birth_date, NaiveDate::from_ymd_opt(1990, 5, 4).unwrap());
        assert_eq!(request.gender, "F");
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        for body in [
            json!({ "birth_date": "1990-05-04", "gender": "F" }),
            json!({ "name": "   ", "birth_date": "1990-05-04", "gender": "F" }),
            json!({ "name": "Kim", "birth_date": "", "gender": "F" }),
            json!({ "name": "Kim", "birth_date": "1990-05-04" }),
            json!({ "name": 42, "birth_date": "1990-05-04", "gender": "F" }),
            json!([]),
        ] {
            assert!(matches!(parse_request(&body), Err(ApiError::MissingFields)), "{}", body);
        }
    }

    #[test]
    fn bad_dates_are_rejected() {
        for date in ["05/04/1990", "1990-13-01", "1990-02-30", "yesterday"] {
            let body = json!({ "name": "Kim", "birth_date": date, "gender": "F" });
            assert!(matches!(parse_request(&body), Err(ApiError::InvalidDate)), "{}", date);
        }
    }

    #[test]
    fn only_name_is_trimmed() {
        let body = json!({ "name": "Kim", "birth_date": " 1990-05-04", "gender": "F" });
        assert!(matches!(parse_request(&body), Err(ApiError::InvalidDate)));

        let body = json!({ "name": "Kim", "birth_date": "1990-05-04 ", "gender": "F" });
        assert!(matches!(parse_request(&body), Err(ApiError::InvalidDate)));

        let request = parse_request(&json!({ "name": "Kim", "birth_date": "1990-05-04", "gender": " F " })).unwrap();
        assert_eq!(request.gender, " F ");
    }

    #[test]
    fn error_status_codes() {
        use axum::http::StatusCode;
        assert_eq!(ApiError::MissingFields.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidDate.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Internal("boom".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Internal("boom".into()).to_string(), "오류가 발생했습니다: boom");
    }
}
