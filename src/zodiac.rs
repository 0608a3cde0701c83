use serde::Serialize;

/// 띠（十二支）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZodiacSign {
    pub name: &'static str,
    pub emoji: &'static str,
}

/// 生年 mod 12 で引く。0 は申（원숭이）
pub static ZODIAC_SIGNS: [ZodiacSign; 12] = [
    ZodiacSign { name: "원숭이", emoji: "🐵" },
    ZodiacSign { name: "닭", emoji: "🐔" },
    ZodiacSign { name: "개", emoji: "🐶" },
    ZodiacSign { name: "돼지", emoji: "🐷" },
    ZodiacSign { name: "쥐", emoji: "🐭" },
    ZodiacSign { name: "소", emoji: "🐮" },
    ZodiacSign { name: "호랑이", emoji: "🐯" },
    ZodiacSign { name: "토끼", emoji: "🐰" },
    ZodiacSign { name: "용", emoji: "🐲" },
    ZodiacSign { name: "뱀", emoji: "🐍" },
    ZodiacSign { name: "말", emoji: "🐴" },
    ZodiacSign { name: "양", emoji: "🐑" },
];

/// 生年から띠を求める（負の年も可）
pub fn compute(birth_year: i32) -> &'static ZodiacSign {
    &ZODIAC_SIGNS[birth_year.rem_euclid(12) as usize]
}

/// 띠ごとの一言運勢
pub fn sign_blurb(sign: &ZodiacSign) -> &'static str {
    match sign.name {
        "쥐" => "지혜롭고 민첩한 성격이 빛을 발할 것입니다. 오늘은 기회를 포착하는 능력이 뛰어난 날입니다.",
        "소" => "성실함과 끈기가 인정받는 날입니다. 꾸준한 노력이 결실을 맺을 것입니다.",
        "호랑이" => "용기와 자신감이 넘치는 하루입니다. 리더십을 발휘할 기회가 찾아올 것입니다.",
        "토끼" => "온화하고 세심한 당신의 장점이 빛나는 날입니다. 주변 사람들과의 조화가 중요합니다.",
        "용" => "카리스마와 추진력이 강해지는 날입니다. 큰 목표를 향해 나아가기 좋은 시기입니다.",
        "뱀" => "지혜와 직관력이 뛰어난 날입니다. 중요한 결정을 내리기에 좋은 시기입니다.",
        "말" => "활발하고 긍정적인 에너지가 넘치는 날입니다. 새로운 도전을 시작하기 좋습니다.",
        "양" => "예술적 감각과 창의력이 돋보이는 날입니다. 평화로운 하루를 보내세요.",
        "원숭이" => "재치와 유머 감각이 빛나는 날입니다. 사교적인 활동이 행운을 가져다줄 것입니다.",
        "닭" => "계획성과 조직력이 뛰어난 날입니다. 체계적으로 일을 처리하면 좋은 결과를 얻을 것입니다.",
        "개" => "충직하고 성실한 당신의 모습이 신뢰를 받는 날입니다. 진심이 통하는 하루가 될 것입니다.",
        "돼지" => "관대하고 낙천적인 성격이 행운을 부릅니다. 여유로운 마음가짐이 좋은 기회를 가져다줄 것입니다.",
        _ => "오늘은 특별히 행운이 따르는 날입니다. 긍정적인 마음으로 하루를 보내세요.",
    }
}
