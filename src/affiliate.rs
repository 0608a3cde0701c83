use crate::product::Product;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::Deserialize;
use sha2::Sha256;
use std::env;
use std::time::Duration;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

const COUPANG_API_BASE: &str = "https://api-gateway.coupang.com";
const SEARCH_PATH: &str = "/v2/providers/affiliate_open_api/apis/openapi/products/search";

/// 英数字と `-_.~/` 以外をエスケープ（空白は %20）
const KEYWORD_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// 商品キーワード検索。失敗は全て空リストに落とす
#[async_trait]
pub trait ProductSearch: Send + Sync {
    async fn search(&self, keyword: &str, limit: usize) -> Vec<Product>;

    /// 色名から検索ワードを組み立てて検索
    async fn search_by_color(&self, color: &str, product_type: &str, limit: usize) -> Vec<Product> {
        self.search(&color_keyword(color, product_type), limit).await
    }
}

/// 금색・은색はアクセサリーで探す
pub fn color_keyword(color: &str, product_type: &str) -> String {
    match color {
        "금색" | "은색" => format!("{} 액세서리", color),
        _ => format!("{} {}", color, product_type),
    }
}

#[derive(Clone)]
struct Credentials {
    access_key: String,
    secret_key: String,
}

/// 쿠팡 파트너스 検索クライアント
pub struct CoupangClient {
    http: reqwest::Client,
    credentials: Option<Credentials>,
    base_url: String,
}

impl CoupangClient {
    pub fn new(access_key: Option<String>, secret_key: Option<String>, timeout: Duration) -> Self {
        // 片方でも欠けていれば検索しない
        let credentials = match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) if !access_key.is_empty() && !secret_key.is_empty() => {
                Some(Credentials { access_key, secret_key })
            }
            _ => None,
        };
        let http = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(http) => http,
            Err(e) => {
                warn!("[Coupang] HTTPクライアント生成失敗、タイムアウト{:?}なしで続行: {}", timeout, e);
                reqwest::Client::new()
            }
        };
        Self {
            http,
            credentials,
            base_url: COUPANG_API_BASE.to_string(),
        }
    }

    /// COUPANG_ACCESS_KEY / COUPANG_SECRET_KEY から生成
    pub fn from_env(timeout: Duration) -> Self {
        let client = Self::new(
            env::var("COUPANG_ACCESS_KEY").ok(),
            env::var("COUPANG_SECRET_KEY").ok(),
            timeout,
        );
        if client.credentials.is_none() {
            info!("[Coupang] APIキー未設定のため商品検索は代替データを使用します");
        }
        client
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// 署名付きURLとAuthorizationヘッダを作る
    fn signed_request(&self, credentials: &Credentials, keyword: &str, now: DateTime<Utc>) -> Result<(Url, String), String> {
        let path_with_query = search_path(keyword);
        let url = Url::parse(&format!("{}{}", self.base_url, path_with_query)).map_err(|e| e.to_string())?;
        let signed_date = signed_date(now);
        let signature = sign(&credentials.secret_key, &signed_date, "GET", &path_with_query)?;
        let authorization = format!(
            "CEA algorithm=HmacSHA256, access-key={}, signed-date={}, signature={}",
            credentials.access_key, signed_date, signature
        );
        Ok((url, authorization))
    }
}

#[async_trait]
impl ProductSearch for CoupangClient {
    async fn search(&self, keyword: &str, limit: usize) -> Vec<Product> {
        let Some(credentials) = &self.credentials else {
            return vec![];
        };

        let (url, authorization) = match self.signed_request(credentials, keyword, Utc::now()) {
            Ok(request) => request,
            Err(e) => {
                warn!("[Coupang] 署名生成エラー: {}", e);
                return vec![];
            }
        };

        let response = match self
            .http
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("[Coupang] APIエラー: {}", e);
                return vec![];
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("[Coupang] 検索失敗 status={} keyword={}", status, keyword);
            return vec![];
        }

        match response.text().await {
            Ok(body) => {
                let products = parse_products(&body, limit);
                debug!("[Coupang] {} 件取得 keyword={}", products.len(), keyword);
                products
            }
            Err(e) => {
                warn!("[Coupang] レスポンス読み込みエラー: {}", e);
                vec![]
            }
        }
    }
}

/// 検索パス + エンコード済みクエリ。署名対象と送信URLで同じ文字列を使う
pub fn search_path(keyword: &str) -> String {
    format!("{}?keyword={}", SEARCH_PATH, utf8_percent_encode(keyword, KEYWORD_ENCODE_SET))
}

/// 署名日時（UTC、秒単位）
pub fn signed_date(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// base64(HMAC-SHA256(secret, signed_date + method + path))
pub fn sign(secret_key: &str, signed_date: &str, method: &str, path: &str) -> Result<String, String> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes()).map_err(|e| e.to_string())?;
    mac.update(signed_date.as_bytes());
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    #[serde(default)]
    product_data: Vec<CoupangProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoupangProduct {
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    product_price: f64,
    #[serde(default)]
    product_image: String,
    #[serde(default)]
    product_url: String,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    review_count: i64,
}

impl From<CoupangProduct> for Product {
    fn from(item: CoupangProduct) -> Self {
        Product {
            name: item.product_name,
            price: item.product_price.round() as i64,
            image_url: item.product_image,
            link_url: item.product_url,
            rating: item.rating,
            review_count: item.review_count,
        }
    }
}

/// data.productData を最大 limit 件まで取り出す。壊れたJSONは空
pub fn parse_products(body: &str, limit: usize) -> Vec<Product> {
    match serde_json::from_str::<SearchResponse>(body) {
        Ok(response) => response
            .data
            .map(|data| data.product_data.into_iter().take(limit).map(Product::from).collect())
            .unwrap_or_default(),
        Err(e) => {
            warn!("[Coupang] レスポンス解析エラー: {}", e);
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use chrono::TimeZone;

    #[test]
    fn signature_matches_known_vector() {
        let path = format!("{}?keyword=test", SEARCH_PATH);
        let signature = sign("secret", "2024-01-02T03:04:05", "GET", &path).unwrap();
        assert_eq!(signature, "uliK/X5G4spdSoGTEdC0mE7ZnKxkv/Zm4j+dWFZHUQI=");
    }

    #[test]
    fn signed_date_has_second_granularity() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(signed_date(now), "2024-01-02T03:04:05");
    }

    #[test]
    fn authorization_header_carries_access_key_and_signature() {
        let client = CoupangClient::new(Some("ak".into()), Some("sk".into()), Duration::from_secs(5));
        let credentials = client.credentials.clone().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let (url, authorization) = client.signed_request(&credentials, "빨간색 의류", now).unwrap();

        assert_eq!(url.path(), SEARCH_PATH);
        assert_eq!(url.query(), Some("keyword=%EB%B9%A8%EA%B0%84%EC%83%89%20%EC%9D%98%EB%A5%98"));
        let expected = sign("sk", "2024-01-02T03:04:05", "GET", &search_path("빨간색 의류")).unwrap();
        assert!(authorization.ends_with(&format!("signature={}", expected)));
        assert!(authorization.starts_with("CEA algorithm=HmacSHA256, access-key=ak, signed-date=2024-01-02T03:04:05, signature="));
    }

    #[test]
    fn keyword_is_percent_encoded_with_space_as_20() {
        assert_eq!(search_path("gold ring"), format!("{}?keyword=gold%20ring", SEARCH_PATH));
        assert_eq!(search_path("a+b&c=d"), format!("{}?keyword=a%2Bb%26c%3Dd", SEARCH_PATH));
        assert_eq!(search_path("x-y_z.~/"), format!("{}?keyword=x-y_z.~/", SEARCH_PATH));
    }

    #[test]
    fn keyword_per_color() {
        assert_eq!(color_keyword("빨간색", "의류"), "빨간색 의류");
        assert_eq!(color_keyword("금색", "의류"), "금색 액세서리");
        assert_eq!(color_keyword("은색", "의류"), "은색 액세서리");
    }

    #[test]
    fn parses_and_limits_product_data() {
        let body = r#"{
            "rCode": "0",
            "data": {
                "productData": [
                    {"productName": "A", "productPrice": 19900, "productImage": "a.jpg", "productUrl": "https://a", "rating": 4.5, "reviewCount": 10},
                    {"productName": "B", "productPrice": 29900.0, "productImage": "b.jpg", "productUrl": "https://b"},
                    {"productName": "C", "productPrice": 39900, "productImage": "c.jpg", "productUrl": "https://c"}
                ]
            }
        }"#;
        let products = parse_products(body, 2);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "A");
        assert_eq!(products[0].review_count, 10);
        assert_eq!(products[1].price, 29900);
        assert_eq!(products[1].rating, 0.0);
    }

    #[test]
    fn malformed_payload_is_empty() {
        assert!(parse_products("not json", 3).is_empty());
        assert!(parse_products(r#"{"rCode": "400"}"#, 3).is_empty());
    }

    #[tokio::test]
    async fn missing_credentials_return_nothing() {
        let client = CoupangClient::new(Some("ak".into()), None, Duration::from_secs(1));
        assert!(!client.has_credentials());
        assert!(client.search("빨간색 의류", 3).await.is_empty());

        let client = CoupangClient::new(Some(String::new()), Some("sk".into()), Duration::from_secs(1));
        assert!(client.search_by_color("파란색", "의류", 3).await.is_empty());
    }

    /// 固定のステータスと本文を返すローカルサーバーを立てる
    async fn stub_server(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route(
            SEARCH_PATH,
            get(move |headers: HeaderMap| async move {
                if !headers.contains_key("authorization") {
                    return (StatusCode::UNAUTHORIZED, "");
                }
                (status, body)
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> CoupangClient {
        CoupangClient::new(Some("ak".into()), Some("sk".into()), Duration::from_secs(2)).with_base_url(base_url)
    }

    #[tokio::test]
    async fn unreachable_host_returns_nothing() {
        let client = client_for("http://127.0.0.1:1");
        assert!(client.search("빨간색 의류", 3).await.is_empty());
    }

    #[tokio::test]
    async fn server_error_returns_nothing() {
        let base = stub_server(StatusCode::INTERNAL_SERVER_ERROR, r#"{"rCode":"500"}"#).await;
        assert!(client_for(&base).search("빨간색 의류", 3).await.is_empty());
    }

    #[tokio::test]
    async fn non_json_body_returns_nothing() {
        let base = stub_server(StatusCode::OK, "<html>maintenance</html>").await;
        assert!(client_for(&base).search("빨간색 의류", 3).await.is_empty());
    }

    #[tokio::test]
    async fn configured_timeout_cuts_slow_search() {
        let app = Router::new().route(
            SEARCH_PATH,
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "{}"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = CoupangClient::new(Some("ak".into()), Some("sk".into()), Duration::from_millis(300))
            .with_base_url(format!("http://{}", addr));
        let started = std::time::Instant::now();
        assert!(client.search("빨간색 의류", 3).await.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn signed_search_returns_products() {
        let base = stub_server(
            StatusCode::OK,
            r#"{"rCode":"0","data":{"productData":[
                {"productName":"빨간 셔츠","productPrice":19900,"productImage":"a.jpg","productUrl":"https://a"},
                {"productName":"빨간 모자","productPrice":9900,"productImage":"b.jpg","productUrl":"https://b"}
            ]}}"#,
        )
        .await;
        let products = client_for(&base).search("빨간색 의류", 1).await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "빨간 셔츠");
        assert_eq!(products[0].price, 19900);
    }
}
