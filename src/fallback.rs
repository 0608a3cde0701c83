use crate::affiliate::ProductSearch;
use crate::error::FallbackError;
use crate::product::{fallback_products, Product};
use crate::zodiac::{sign_blurb, ZodiacSign};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, info};

pub const LUCKY_COLORS: [&str; 15] = [
    "빨간색", "파란색", "노란색", "초록색", "보라색",
    "주황색", "분홍색", "하늘색", "민트색", "베이지색",
    "흰색", "검은색", "금색", "은색", "청록색",
];

const OVERALL_FORTUNES: [&str; 5] = [
    "오늘은 새로운 시작을 알리는 긍정적인 에너지가 가득한 날입니다. 작은 변화들이 큰 행운으로 이어질 수 있으니, 직관을 믿고 행동하세요. 주변 사람들과의 소통이 특히 중요한 시기입니다.",
    "행운의 기운이 당신을 감싸고 있습니다. 오늘 하루는 평소보다 더 적극적으로 행동하면 좋은 결과를 얻을 수 있습니다. 오후 시간대에 특히 좋은 일이 생길 가능성이 높습니다.",
    "차분하게 하루를 시작하세요. 급하게 서두르기보다는 신중한 판단이 필요한 시기입니다. 작은 일에서도 배움을 얻을 수 있으니, 모든 순간에 집중하세요.",
    "오늘은 당신의 매력이 빛나는 날입니다. 자신감을 가지고 하루를 보내면 예상치 못한 좋은 소식을 들을 수 있습니다. 긍정적인 마음가짐이 행운을 불러옵니다.",
    "변화의 바람이 불고 있습니다. 새로운 기회가 찾아올 수 있으니 마음을 열고 받아들이세요. 과거에 집착하기보다는 미래를 향해 나아가는 것이 좋습니다.",
];

const LOTTO_MAX: usize = 45;
const LOTTO_PICKS: usize = 6;

/// 名前と年齢から決まる抽選結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuckyDraw {
    pub color: &'static str,
    /// 昇順、重複なし、1..=45
    pub numbers: Vec<u32>,
    pub overall: &'static str,
}

impl LuckyDraw {
    pub fn numbers_line(&self) -> String {
        self.numbers
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 文字コードの総和 + 年齢
pub fn seed_for(name: &str, age: i32) -> u64 {
    name.chars()
        .fold(0i64, |acc, c| acc.wrapping_add(c as i64))
        .wrapping_add(i64::from(age)) as u64
}

/// 呼び出しごとに専用のRNGを作るので並行リクエスト間で干渉しない。
/// 色 → 番号 → 総合運の順に同じRNGから引く
pub fn draw(name: &str, age: i32) -> Result<LuckyDraw, FallbackError> {
    let mut rng = StdRng::seed_from_u64(seed_for(name, age));

    let color = *LUCKY_COLORS
        .choose(&mut rng)
        .ok_or(FallbackError::EmptyTable("lucky colors"))?;

    let mut numbers: Vec<u32> = index::sample(&mut rng, LOTTO_MAX, LOTTO_PICKS)
        .into_iter()
        .map(|i| i as u32 + 1)
        .collect();
    numbers.sort_unstable();

    let overall = *OVERALL_FORTUNES
        .choose(&mut rng)
        .ok_or(FallbackError::EmptyTable("overall fortunes"))?;

    Ok(LuckyDraw { color, numbers, overall })
}

/// LLMを使わないテンプレート運勢
pub struct FallbackFortuneGenerator {
    search: Arc<dyn ProductSearch>,
    product_type: String,
    product_limit: usize,
}

impl FallbackFortuneGenerator {
    pub fn new(search: Arc<dyn ProductSearch>, product_type: impl Into<String>, product_limit: usize) -> Self {
        Self {
            search,
            product_type: product_type.into(),
            product_limit,
        }
    }

    pub async fn generate(
        &self,
        name: &str,
        age: i32,
        _gender: &str,
        zodiac: &ZodiacSign,
    ) -> Result<(String, Vec<Product>), FallbackError> {
        let draw = draw(name, age)?;
        debug!("[Fallback] color={} numbers={:?}", draw.color, draw.numbers);

        let mut products = self
            .search
            .search_by_color(draw.color, &self.product_type, self.product_limit)
            .await;
        if products.is_empty() {
            info!("[Fallback] 商品検索が空のため代替商品を使用: {}", draw.color);
            products = fallback_products(draw.color);
        }

        let text = render(&draw, zodiac, &products)?;
        Ok((text, products))
    }
}

fn render(draw: &LuckyDraw, zodiac: &ZodiacSign, products: &[Product]) -> Result<String, FallbackError> {
    let mut text = String::new();
    writeln!(text, "**오늘의 운세**")?;
    writeln!(text, "{}", draw.overall)?;
    writeln!(text)?;
    writeln!(text, "**띠별 운세**")?;
    writeln!(text, "{} {}띠: {}", zodiac.emoji, zodiac.name, sign_blurb(zodiac))?;
    writeln!(text)?;
    writeln!(text, "**행운의 로또 번호**")?;
    writeln!(text, "{}", draw.numbers_line())?;
    writeln!(text)?;
    writeln!(text, "**행운의 색상**")?;
    writeln!(text, "{}", draw.color)?;
    writeln!(text)?;
    writeln!(text, "**추천 상품**")?;
    for product in products {
        writeln!(text, "- {} ({})", product.name, product.price_label())?;
    }
    Ok(text)
}
