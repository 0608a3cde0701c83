use crate::affiliate::CoupangClient;
use crate::config::AppConfig;
use crate::error::LlmError;
use crate::fallback::FallbackFortuneGenerator;
use crate::llm::{self, LlmClient, FAILURE_MARKER};
use crate::product::Product;
use crate::quote::{random_quote, Quote};
use crate::zodiac::{self, ZodiacSign};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

const DATE_FORMAT: &str = "%Y년 %m월 %d일";
const DEGRADED_TEXT: &str = "죄송합니다. 지금은 운세를 준비하지 못했습니다. 잠시 후 다시 시도해주세요.";

/// 検証済みの入力
#[derive(Debug, Clone)]
pub struct FortuneRequest {
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FortuneResult {
    pub full_text: String,
    pub name: String,
    pub zodiac: ZodiacSign,
    pub date: String,
    pub quote: Quote,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_backup: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// LLM呼び出しの結果分類
#[derive(Debug)]
pub enum LlmOutcome {
    Success(String),
    Timeout,
    /// 本文に失敗マーカーがある、または空
    ErrorResponse(String),
    /// 通信・設定エラー
    Exception(String),
}

impl LlmOutcome {
    pub fn classify(result: Result<String, LlmError>) -> Self {
        match result {
            Ok(text) if text.trim().is_empty() => LlmOutcome::ErrorResponse(text),
            Ok(text) if text.contains(FAILURE_MARKER) => LlmOutcome::ErrorResponse(text),
            Ok(text) => LlmOutcome::Success(text),
            Err(e) => LlmOutcome::Exception(e.to_string()),
        }
    }
}

/// 満年齢ではなく「今年 - 生年」
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    today.year() - birth_date.year()
}

/// LLMへの依頼文。フォールバックと同じ見出し構成で返させる
pub fn build_prompt(request: &FortuneRequest, age: i32, zodiac: &ZodiacSign, today: NaiveDate) -> String {
    format!(
        "당신은 전문 운세 상담가입니다. 다음 정보를 바탕으로 오늘의 운세를 작성해주세요:

- 이름: {name}님
- 생년월일: {birth} (만 {age}세)
- 성별: {gender}
- 띠: {emoji} {zodiac}띠
- 오늘 날짜: {today}

다음 형식으로 작성해주세요:

**오늘의 운세**
[2-3문장으로 구체적이고 긍정적인 오늘의 운세]

**행운의 로또 번호**
[1부터 45 사이의 서로 다른 숫자 6개를 오름차순, 쉼표로 구분]

**행운의 색상**
[하나의 색상]

**추천 상품**
[행운의 색상과 어울리는 아이템 3가지, 한 줄에 하나씩 '- '로 시작]

희망적인 조언을 담아주세요.",
        name = request.name,
        birth = request.birth_date.format(DATE_FORMAT),
        age = age,
        gender = request.gender,
        emoji = zodiac.emoji,
        zodiac = zodiac.name,
        today = today.format(DATE_FORMAT),
    )
}

/// LLM → フォールバック → 名言 の順で運勢を組み立てる
pub struct FortuneService {
    llm: Option<Arc<dyn LlmClient>>,
    fallback: Arc<FallbackFortuneGenerator>,
    llm_timeout: Duration,
}

impl FortuneService {
    pub fn new(
        llm: Option<Arc<dyn LlmClient>>,
        fallback: Arc<FallbackFortuneGenerator>,
        llm_timeout: Duration,
    ) -> Self {
        Self {
            llm,
            fallback,
            llm_timeout,
        }
    }

    /// 設定と環境変数から組み立てる。LLMキーが無ければフォールバック専用で動く
    pub fn from_config(config: &AppConfig) -> Self {
        let llm = match llm::build_client(&config.llm) {
            Ok(client) => {
                info!("[Fortune] LLMプロバイダ: {}", client.name());
                Some(client)
            }
            Err(e) => {
                warn!("[Fortune] LLMクライアントを作成できません（フォールバックのみで動作）: {}", e);
                None
            }
        };
        let search = Arc::new(CoupangClient::from_env(config.affiliate_timeout()));
        let fallback = Arc::new(FallbackFortuneGenerator::new(
            search,
            config.affiliate.product_type.clone(),
            config.affiliate.product_limit,
        ));
        Self::new(llm, fallback, config.llm_timeout())
    }

    pub async fn tell(&self, request: &FortuneRequest) -> FortuneResult {
        self.tell_on(request, Local::now().date_naive()).await
    }

    /// 日付を指定して占う
    pub async fn tell_on(&self, request: &FortuneRequest, today: NaiveDate) -> FortuneResult {
        let zodiac = zodiac::compute(request.birth_date.year());
        let age = age_on(request.birth_date, today);
        let date = today.format(DATE_FORMAT).to_string();
        let prompt = build_prompt(request, age, zodiac, today);

        match self.attempt_llm(&prompt).await {
            LlmOutcome::Success(text) => {
                info!("[Fortune] LLM応答成功: {} ({} chars)", request.name, text.len());
                FortuneResult {
                    full_text: text,
                    name: request.name.clone(),
                    zodiac: *zodiac,
                    date,
                    quote: *random_quote(),
                    is_backup: false,
                    products: None,
                    error: None,
                }
            }
            outcome => {
                warn!("[Fortune] LLM失敗のためフォールバック: {:?}", outcome);
                self.run_fallback(request, age, zodiac, date).await
            }
        }
    }

    async fn attempt_llm(&self, prompt: &str) -> LlmOutcome {
        let Some(client) = &self.llm else {
            return LlmOutcome::Exception("LLM client is not configured".to_string());
        };
        match timeout(self.llm_timeout, client.generate(prompt)).await {
            Ok(result) => LlmOutcome::classify(result),
            Err(_) => LlmOutcome::Timeout,
        }
    }

    /// 生成器のpanicもここで止めるため別タスクで動かす
    async fn run_fallback(
        &self,
        request: &FortuneRequest,
        age: i32,
        zodiac: &'static ZodiacSign,
        date: String,
    ) -> FortuneResult {
        let fallback = Arc::clone(&self.fallback);
        let name = request.name.clone();
        let gender = request.gender.clone();
        let task = tokio::spawn(async move { fallback.generate(&name, age, &gender, zodiac).await });

        let failure = match task.await {
            Ok(Ok((text, products))) => {
                return FortuneResult {
                    full_text: text,
                    name: request.name.clone(),
                    zodiac: *zodiac,
                    date,
                    quote: *random_quote(),
                    is_backup: true,
                    products: if products.is_empty() { None } else { Some(products) },
                    error: None,
                };
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => e.to_string(),
        };

        error!("[Fortune] フォールバック生成失敗: {}", failure);
        FortuneResult {
            full_text: DEGRADED_TEXT.to_string(),
            name: request.name.clone(),
            zodiac: *zodiac,
            date,
            quote: *random_quote(),
            is_backup: true,
            products: None,
            error: Some(format!("운세 생성 중 오류가 발생했습니다: {}", failure)),
        }
    }
}
