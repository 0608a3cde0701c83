use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

pub static QUOTES: [Quote; 15] = [
    Quote { text: "행복은 습관이다. 그것을 몸에 지니라.", author: "허버드" },
    Quote { text: "미래는 현재 우리가 무엇을 하는가에 달려 있다.", author: "마하트마 간디" },
    Quote { text: "성공의 비결은 시작하는 것이다.", author: "마크 트웨인" },
    Quote { text: "믿음만 있다면 무엇이든 가능하다.", author: "괴테" },
    Quote { text: "당신이 할 수 있다고 믿든, 할 수 없다고 믿든, 믿는 대로 될 것이다.", author: "헨리 포드" },
    Quote { text: "좋은 일을 하는 데 가장 좋은 때는 바로 지금이다.", author: "중국 속담" },
    Quote { text: "인생은 자전거를 타는 것과 같다. 균형을 유지하려면 계속 움직여야 한다.", author: "아인슈타인" },
    Quote { text: "어제로부터 배우고, 오늘을 위해 살고, 내일을 위해 희망하라.", author: "아인슈타인" },
    Quote { text: "기회는 일어나는 것이 아니라 만들어가는 것이다.", author: "크리스 그로서" },
    Quote { text: "성공은 최종적인 것이 아니며, 실패는 치명적인 것이 아니다. 중요한 것은 계속하는 용기다.", author: "윈스턴 처칠" },
    Quote { text: "당신의 시간은 한정되어 있으니, 다른 사람의 인생을 사는 데 낭비하지 마라.", author: "스티브 잡스" },
    Quote { text: "행복의 문이 하나 닫히면 다른 문이 열린다.", author: "헬렌 켈러" },
    Quote { text: "변화를 원한다면 스스로 그 변화가 되어라.", author: "마하트마 간디" },
    Quote { text: "꿈을 이루는 비결은 꿈을 꾸는 것이다.", author: "월트 디즈니" },
    Quote { text: "실패는 성공의 어머니다.", author: "토마스 에디슨" },
];

/// 名言をランダムに1つ返す
pub fn random_quote() -> &'static Quote {
    random_quote_with(&mut rand::thread_rng())
}

pub fn random_quote_with<R: Rng + ?Sized>(rng: &mut R) -> &'static Quote {
    // 空でない固定テーブルなので必ず選べる
    QUOTES.choose(rng).unwrap_or(&QUOTES[0])
}
