use serde::{Deserialize, Serialize};

/// 추천 상품
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    /// 원（補助単位なし）
    pub price: i64,
    pub image_url: String,
    pub link_url: String,
    pub rating: f64,
    pub review_count: i64,
}

impl Product {
    /// "12,345원" 形式
    pub fn price_label(&self) -> String {
        format!("{}원", format_thousands(self.price))
    }
}

/// 3桁区切り
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

struct PlaceholderItem {
    label: &'static str,
    price: i64,
    image_text: &'static str,
    rating: f64,
    review_count: i64,
}

struct ColorEntry {
    color: &'static str,
    background: &'static str,
    foreground: &'static str,
    items: [PlaceholderItem; 3],
}

static COLOR_CATALOG: [ColorEntry; 5] = [
    ColorEntry {
        color: "빨간색",
        background: "FF0000",
        foreground: "FFFFFF",
        items: [
            PlaceholderItem { label: "기본 티셔츠", price: 19900, image_text: "Red+Tee", rating: 4.5, review_count: 123 },
            PlaceholderItem { label: "캐주얼 가방", price: 39000, image_text: "Red+Bag", rating: 4.3, review_count: 87 },
            PlaceholderItem { label: "스니커즈", price: 89000, image_text: "Red+Shoes", rating: 4.7, review_count: 256 },
        ],
    },
    ColorEntry {
        color: "파란색",
        background: "0000FF",
        foreground: "FFFFFF",
        items: [
            PlaceholderItem { label: "후드티", price: 45000, image_text: "Blue+Hoodie", rating: 4.6, review_count: 198 },
            PlaceholderItem { label: "운동화", price: 129000, image_text: "Blue+Shoes", rating: 4.8, review_count: 342 },
            PlaceholderItem { label: "시계", price: 159000, image_text: "Blue+Watch", rating: 4.4, review_count: 156 },
        ],
    },
    ColorEntry {
        color: "노란색",
        background: "FFFF00",
        foreground: "000000",
        items: [
            PlaceholderItem { label: "스카프", price: 25000, image_text: "Yellow+Scarf", rating: 4.2, review_count: 94 },
            PlaceholderItem { label: "지갑", price: 59000, image_text: "Yellow+Wallet", rating: 4.5, review_count: 178 },
            PlaceholderItem { label: "케이스", price: 15000, image_text: "Yellow+Case", rating: 4.3, review_count: 67 },
        ],
    },
    ColorEntry {
        color: "초록색",
        background: "00FF00",
        foreground: "000000",
        items: [
            PlaceholderItem { label: "후드티", price: 42000, image_text: "Green+Hoodie", rating: 4.5, review_count: 145 },
            PlaceholderItem { label: "가방", price: 68000, image_text: "Green+Bag", rating: 4.4, review_count: 112 },
            PlaceholderItem { label: "모자", price: 28000, image_text: "Green+Cap", rating: 4.6, review_count: 203 },
        ],
    },
    ColorEntry {
        color: "보라색",
        background: "800080",
        foreground: "FFFFFF",
        items: [
            PlaceholderItem { label: "스웨터", price: 89000, image_text: "Purple+Sweater", rating: 4.7, review_count: 234 },
            PlaceholderItem { label: "액세서리", price: 35000, image_text: "Purple+Accessory", rating: 4.3, review_count: 98 },
            PlaceholderItem { label: "양말", price: 12000, image_text: "Purple+Socks", rating: 4.4, review_count: 156 },
        ],
    },
];

static GENERIC_ITEMS: [PlaceholderItem; 3] = [
    PlaceholderItem { label: "기본 상품 1", price: 30000, image_text: "Product+1", rating: 4.5, review_count: 100 },
    PlaceholderItem { label: "기본 상품 2", price: 50000, image_text: "Product+2", rating: 4.3, review_count: 80 },
    PlaceholderItem { label: "기본 상품 3", price: 70000, image_text: "Product+3", rating: 4.6, review_count: 120 },
];

fn placeholder(color: &str, background: &str, foreground: &str, item: &PlaceholderItem) -> Product {
    Product {
        name: format!("{} {}", color, item.label),
        price: item.price,
        image_url: format!(
            "https://via.placeholder.com/200x200/{}/{}?text={}",
            background, foreground, item.image_text
        ),
        link_url: "#".to_string(),
        rating: item.rating,
        review_count: item.review_count,
    }
}

/// ライブ検索が空のときの代替商品。色の登録が無ければ汎用3件
pub fn fallback_products(color: &str) -> Vec<Product> {
    match COLOR_CATALOG.iter().find(|entry| entry.color == color) {
        Some(entry) => entry
            .items
            .iter()
            .map(|it| placeholder(color, entry.background, entry.foreground, it))
            .collect(),
        None => GENERIC_ITEMS
            .iter()
            .map(|it| placeholder(color, "CCCCCC", "666666", it))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separator() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(19900), "19,900");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands(-45000), "-45,000");
    }

    #[test]
    fn registered_color_uses_its_own_items() {
        let products = fallback_products("빨간색");
        assert_eq!(products.len(), 3);
        assert_eq!(products[0].name, "빨간색 기본 티셔츠");
        assert_eq!(products[0].price_label(), "19,900원");
        assert!(products[2].image_url.contains("/FF0000/FFFFFF?text=Red+Shoes"));
    }

    #[test]
    fn unregistered_color_gets_generic_set() {
        let products = fallback_products("금색");
        assert_eq!(products.len(), 3);
        assert_eq!(products[0].name, "금색 기본 상품 1");
        assert!(products.iter().all(|p| p.link_url == "#"));
    }
}
