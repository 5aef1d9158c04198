//! 五行分析模块
//!
//! 以日干判定五行，结合品种特性给出性格描述，并提供两个五行之间的相生相克判断。

use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::ganzi::Stem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 未匹配到任何品种时使用的键
pub const DEFAULT_BREED: &str = "믹스";

/// 五行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    /// 韩文写法（목/화/토/금/수）
    pub fn hangul(&self) -> &'static str {
        match self {
            Element::Wood => "목",
            Element::Fire => "화",
            Element::Earth => "토",
            Element::Metal => "금",
            Element::Water => "수",
        }
    }

    pub fn hanja(&self) -> char {
        match self {
            Element::Wood => '木',
            Element::Fire => '火',
            Element::Earth => '土',
            Element::Metal => '金',
            Element::Water => '水',
        }
    }

    /// 双文字显示形式，如 `수(水)`
    pub fn display_name(&self) -> String {
        format!("{}({})", self.hangul(), self.hanja())
    }

    pub fn from_hangul(s: &str) -> Option<Element> {
        Self::ALL.into_iter().find(|e| e.hangul() == s)
    }

    /// 相生：本五行所生者（木生火、火生土、土生金、金生水、水生木）
    pub fn generates(&self) -> Element {
        match self {
            Element::Wood => Element::Fire,
            Element::Fire => Element::Earth,
            Element::Earth => Element::Metal,
            Element::Metal => Element::Water,
            Element::Water => Element::Wood,
        }
    }

    /// 相克：本五行所克者（木克土、火克金、土克水、金克木、水克火）
    pub fn suppresses(&self) -> Element {
        match self {
            Element::Wood => Element::Earth,
            Element::Fire => Element::Metal,
            Element::Earth => Element::Water,
            Element::Metal => Element::Wood,
            Element::Water => Element::Fire,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hangul())
    }
}

/// 五行对应的性格与活动建议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementTraits {
    pub personality: &'static str,
    pub activity_tip: &'static str,
}

/// 日干五行 + 品种特性的组合结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temperament {
    /// 显示形式，如 `수(水)`
    pub five_element: String,
    pub temperament: String,
    pub activity_tip: String,
}

/// 天干 → 五行（全映射）
pub fn element_of(stem: Stem) -> Element {
    match stem {
        Stem::Gap | Stem::Eul => Element::Wood,
        Stem::Byeong | Stem::Jeong => Element::Fire,
        Stem::Mu | Stem::Gi => Element::Earth,
        Stem::Gyeong | Stem::Sin => Element::Metal,
        Stem::Im | Stem::Gye => Element::Water,
    }
}

/// 以韩文读音查询天干的五行
///
/// 供只拿到字符串的调用方使用（例如外部数据里的日干读音）。
/// 内部分析走类型化的 `element_of`，不会经过这里；这里失败说明外部数据与天干表不一致。
pub fn element_of_label(stem: &str) -> AnalysisResult<Element> {
    match Stem::from_hangul(stem) {
        Some(stem) => Ok(element_of(stem)),
        None => {
            tracing::error!("天干表不一致，未知天干: {}", stem);
            Err(AnalysisError::UnknownStem(stem.to_string()))
        }
    }
}

/// 五行 → 性格描述（全映射）
pub fn traits_of(element: Element) -> ElementTraits {
    match element {
        Element::Wood => ElementTraits {
            personality: "호기심이 많고 새로운 것을 향해 쑥쑥 뻗어 나가는 성장형",
            activity_tip: "새로운 산책로 탐험이나 숲길 산책을 좋아합니다 🌳",
        },
        Element::Fire => ElementTraits {
            personality: "밝고 열정적이며 사람을 무척 좋아하는 분위기 메이커",
            activity_tip: "공놀이, 터그 놀이처럼 에너지를 발산하는 활동이 좋습니다 🔥",
        },
        Element::Earth => ElementTraits {
            personality: "듬직하고 느긋하며 한결같이 곁을 지키는 든든한 타입",
            activity_tip: "규칙적인 산책과 익숙한 루틴 속에서 안정감을 느낍니다 🏔️",
        },
        Element::Metal => ElementTraits {
            personality: "영리하고 자기 주관이 뚜렷하며 원칙을 잘 지키는 타입",
            activity_tip: "노즈워크, 트릭 훈련 같은 두뇌 활동을 즐깁니다 ✨",
        },
        Element::Water => ElementTraits {
            personality: "감수성이 풍부하고 교감을 좋아하는 섬세한 타입",
            activity_tip: "물놀이, 변화가 있는 활동을 좋아합니다 💧",
        },
    }
}

/// 以韩文写法查询五行的性格描述
///
/// 与 `element_of_label` 相同，是字符串输入的入口；类型化路径用 `traits_of`。
pub fn traits_of_label(element: &str) -> AnalysisResult<ElementTraits> {
    match Element::from_hangul(element) {
        Some(element) => Ok(traits_of(element)),
        None => {
            tracing::error!("五行表不一致，未知五行: {}", element);
            Err(AnalysisError::UnknownElement(element.to_string()))
        }
    }
}

/// 品种特性表（顺序即部分匹配时的优先顺序）
const BREED_TRAITS: &[(&str, &str)] = &[
    ("말티즈", "애교가 많고 보호자 곁을 떠나지 않는 말티즈 특유의 다정함이 있습니다"),
    ("푸들", "눈치가 빠르고 배우는 것을 좋아하는 푸들다운 영리함이 있습니다"),
    ("포메라니안", "작은 몸집에도 당당하고 활발한 포메라니안의 자신감이 있습니다"),
    ("시추", "느긋하고 온순해서 누구와도 잘 어울리는 시추의 여유가 있습니다"),
    ("비숑", "솜사탕처럼 명랑하고 장난기 많은 비숑의 발랄함이 있습니다"),
    ("요크셔테리어", "용감하고 호기심이 강한 요크셔테리어의 당찬 기질이 있습니다"),
    ("치와와", "보호자에게 깊이 애착하는 치와와의 충성심이 있습니다"),
    ("닥스훈트", "냄새 탐색을 좋아하고 끈기 있는 닥스훈트의 사냥 본능이 있습니다"),
    ("시바견", "독립적이고 깔끔한 시바견 특유의 도도함이 있습니다"),
    ("진돗개", "한 사람을 향한 충성심과 영리함을 갖춘 진돗개의 기개가 있습니다"),
    ("골든리트리버", "사람을 좋아하고 온화한 골든리트리버의 너그러움이 있습니다"),
    ("웰시코기", "부지런하고 명랑한 웰시코기의 활기가 있습니다"),
    (DEFAULT_BREED, "여러 매력을 고루 갖춘 믹스견의 균형 잡힌 성격이 있습니다"),
];

/// 品种（自由文本）→ 特性描述
///
/// 1. 精确匹配；2. 表中第一个与标签互为子串的键（按表顺序，不是最长匹配）；
/// 3. 默认使用 `믹스` 的描述。
/// 空白标签直接使用默认描述。
pub fn breed_trait(label: &str) -> &'static str {
    let label = label.trim();
    if label.is_empty() {
        return default_breed_trait();
    }

    if let Some(&(_, trait_text)) = BREED_TRAITS.iter().find(|(key, _)| *key == label) {
        return trait_text;
    }

    BREED_TRAITS
        .iter()
        .find(|(key, _)| label.contains(key) || key.contains(label))
        .map(|(_, trait_text)| *trait_text)
        .unwrap_or_else(default_breed_trait)
}

fn default_breed_trait() -> &'static str {
    BREED_TRAITS
        .iter()
        .find(|(key, _)| *key == DEFAULT_BREED)
        .map(|(_, trait_text)| *trait_text)
        .unwrap_or_default()
}

/// 日干五行与品种特性合成完整的性格分析
pub fn combine_temperament(stem: Stem, breed: &str) -> Temperament {
    let element = element_of(stem);
    let traits = traits_of(element);

    Temperament {
        five_element: element.display_name(),
        temperament: format!("{}, {}", traits.personality, breed_trait(breed)),
        activity_tip: traits.activity_tip.to_string(),
    }
}

/// 相生相克关系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
    /// A 生 B
    GenerativeStrong,
    /// B 生 A
    GenerativePositive,
    /// A 克 B
    DestructiveOutgoing,
    /// B 克 A
    DestructiveIncoming,
    /// 同一五行
    SameElement,
    Neutral,
}

impl Relationship {
    /// 关系名称（상생/상극/동기/중성）
    pub fn label(&self) -> &'static str {
        match self {
            Relationship::GenerativeStrong | Relationship::GenerativePositive => "상생",
            Relationship::DestructiveOutgoing | Relationship::DestructiveIncoming => "상극",
            Relationship::SameElement => "동기",
            Relationship::Neutral => "중성",
        }
    }

    /// 相性评价
    pub fn rating(&self) -> &'static str {
        match self {
            Relationship::GenerativeStrong => "매우 좋음",
            Relationship::GenerativePositive => "좋음",
            Relationship::DestructiveOutgoing | Relationship::DestructiveIncoming => "주의",
            Relationship::SameElement | Relationship::Neutral => "보통",
        }
    }
}

/// 两个五行的相性结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityResult {
    #[serde(skip)]
    pub kind: Relationship,
    pub relationship: String,
    pub compatibility: String,
    pub description: String,
}

/// 判断五行 A 与 B 的关系，按顺序第一个命中者为准
pub fn compatibility(a: Element, b: Element) -> CompatibilityResult {
    let (kind, description) = if a.generates() == b {
        (
            Relationship::GenerativeStrong,
            format!("{}의 기운이 {}을(를) 북돋아 줍니다", a.display_name(), b.display_name()),
        )
    } else if b.generates() == a {
        (
            Relationship::GenerativePositive,
            format!("{}의 기운이 {}을(를) 북돋아 줍니다", b.display_name(), a.display_name()),
        )
    } else if a.suppresses() == b {
        (
            Relationship::DestructiveOutgoing,
            format!("{}의 기운이 {}을(를) 억누릅니다", a.display_name(), b.display_name()),
        )
    } else if b.suppresses() == a {
        (
            Relationship::DestructiveIncoming,
            format!("{}의 기운이 {}을(를) 억누릅니다", b.display_name(), a.display_name()),
        )
    } else if a == b {
        (
            Relationship::SameElement,
            "같은 오행이라 서로를 편안하게 이해합니다".to_string(),
        )
    } else {
        (Relationship::Neutral, "특별한 상성은 없습니다".to_string())
    };

    CompatibilityResult {
        kind,
        relationship: kind.label().to_string(),
        compatibility: kind.rating().to_string(),
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_mapping_is_total() {
        for stem in Stem::ALL {
            let element = element_of(stem);
            assert!(Element::ALL.contains(&element));
        }
        assert_eq!(element_of(Stem::Gye), Element::Water);
        assert_eq!(element_of(Stem::Gap), Element::Wood);
        assert_eq!(element_of(Stem::Gyeong), Element::Metal);
    }

    #[test]
    fn test_label_lookups_guard_unknown_values() {
        assert_eq!(element_of_label("계").unwrap(), Element::Water);
        assert_eq!(
            element_of_label("자").unwrap_err(),
            AnalysisError::UnknownStem("자".to_string())
        );
        assert!(traits_of_label("수").is_ok());
        assert_eq!(
            traits_of_label("물").unwrap_err(),
            AnalysisError::UnknownElement("물".to_string())
        );
    }

    #[test]
    fn test_cycles_are_permutations() {
        let generated: Vec<_> = Element::ALL.iter().map(|e| e.generates()).collect();
        let suppressed: Vec<_> = Element::ALL.iter().map(|e| e.suppresses()).collect();
        for e in Element::ALL {
            assert!(generated.contains(&e));
            assert!(suppressed.contains(&e));
        }
    }

    #[test]
    fn test_breed_exact_and_partial_match() {
        assert!(breed_trait("푸들").contains("푸들"));
        // 标签包含键
        assert!(breed_trait("토이푸들").contains("푸들"));
        // 键包含标签
        assert!(breed_trait("시바").contains("시바견"));
        assert!(breed_trait("  말티즈 ").contains("말티즈"));
    }

    #[test]
    fn test_breed_partial_match_takes_first_table_entry() {
        // 同时包含 "말티즈" 和 "푸들"，按表顺序取 "말티즈"
        let trait_text = breed_trait("말티즈푸들");
        assert!(trait_text.contains("말티즈"));
        assert!(!trait_text.contains("푸들"));
    }

    #[test]
    fn test_breed_default() {
        let default = breed_trait(DEFAULT_BREED);
        assert_eq!(breed_trait("그레이하운드"), default);
        assert_eq!(breed_trait("   "), default);
    }

    #[test]
    fn test_combine_temperament() {
        let result = combine_temperament(Stem::Gye, "말티즈");
        let traits = traits_of(Element::Water);

        assert_eq!(result.five_element, "수(水)");
        assert_eq!(
            result.temperament,
            format!("{}, {}", traits.personality, breed_trait("말티즈"))
        );
        assert_eq!(result.activity_tip, traits.activity_tip);
    }

    #[test]
    fn test_compatibility_categories() {
        let strong = compatibility(Element::Wood, Element::Fire);
        assert_eq!(strong.kind, Relationship::GenerativeStrong);
        assert_eq!(strong.relationship, "상생");
        assert_eq!(strong.compatibility, "매우 좋음");

        let positive = compatibility(Element::Fire, Element::Wood);
        assert_eq!(positive.kind, Relationship::GenerativePositive);
        assert_eq!(positive.compatibility, "좋음");

        let outgoing = compatibility(Element::Water, Element::Fire);
        assert_eq!(outgoing.kind, Relationship::DestructiveOutgoing);
        assert_eq!(outgoing.compatibility, "주의");

        let incoming = compatibility(Element::Fire, Element::Water);
        assert_eq!(incoming.kind, Relationship::DestructiveIncoming);
        assert_eq!(incoming.relationship, "상극");

        let same = compatibility(Element::Earth, Element::Earth);
        assert_eq!(same.kind, Relationship::SameElement);
        assert_eq!(same.relationship, "동기");
        assert_eq!(same.compatibility, "보통");
    }

    #[test]
    fn test_compatibility_resolves_all_pairs() {
        for a in Element::ALL {
            for b in Element::ALL {
                let result = compatibility(a, b);
                // 五行循环为置换，不同五行之间总能落在相生或相克中
                if a == b {
                    assert_eq!(result.kind, Relationship::SameElement);
                } else {
                    assert_ne!(result.kind, Relationship::Neutral);
                    assert_ne!(result.kind, Relationship::SameElement);
                }
            }
        }
    }
}
