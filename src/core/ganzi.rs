//! 干支记法解析模块
//!
//! 负责把 "辛丑年 己亥月 癸未日" 这类字符串拆成年柱、月柱、日柱，
//! 再把每一柱拆成天干和地支。
//! 天干十个、地支十二个，字母表固定，解析时只认汉字写法。

use crate::core::error::{AnalysisError, AnalysisResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 三柱记法：`<干><支>年 <干><支>月 <干><支>日`，锚定在开头，尾部内容忽略
static THREE_PILLARS_RE: Lazy<Regex> = Lazy::new(|| {
    let pillar = "([甲乙丙丁戊己庚辛壬癸][子丑寅卯辰巳午未申酉戌亥])";
    Regex::new(&format!(r"^{pillar}年\s*{pillar}月\s*{pillar}日")).expect("valid ganzi regex")
});

/// 天干
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stem {
    Gap,
    Eul,
    Byeong,
    Jeong,
    Mu,
    Gi,
    Gyeong,
    Sin,
    Im,
    Gye,
}

impl Stem {
    /// 按周期顺序排列的全部天干
    pub const ALL: [Stem; 10] = [
        Stem::Gap,
        Stem::Eul,
        Stem::Byeong,
        Stem::Jeong,
        Stem::Mu,
        Stem::Gi,
        Stem::Gyeong,
        Stem::Sin,
        Stem::Im,
        Stem::Gye,
    ];

    /// 汉字写法
    pub fn hanja(&self) -> char {
        match self {
            Stem::Gap => '甲',
            Stem::Eul => '乙',
            Stem::Byeong => '丙',
            Stem::Jeong => '丁',
            Stem::Mu => '戊',
            Stem::Gi => '己',
            Stem::Gyeong => '庚',
            Stem::Sin => '辛',
            Stem::Im => '壬',
            Stem::Gye => '癸',
        }
    }

    /// 韩文读音
    pub fn hangul(&self) -> &'static str {
        match self {
            Stem::Gap => "갑",
            Stem::Eul => "을",
            Stem::Byeong => "병",
            Stem::Jeong => "정",
            Stem::Mu => "무",
            Stem::Gi => "기",
            Stem::Gyeong => "경",
            Stem::Sin => "신",
            Stem::Im => "임",
            Stem::Gye => "계",
        }
    }

    /// 在周期中的位置（从0开始）
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_hanja(c: char) -> Option<Stem> {
        Self::ALL.into_iter().find(|s| s.hanja() == c)
    }

    pub fn from_hangul(s: &str) -> Option<Stem> {
        Self::ALL.into_iter().find(|stem| stem.hangul() == s)
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hanja())
    }
}

/// 地支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Branch {
    Ja,
    Chuk,
    In,
    Myo,
    Jin,
    Sa,
    O,
    Mi,
    Sin,
    Yu,
    Sul,
    Hae,
}

impl Branch {
    /// 按周期顺序排列的全部地支
    pub const ALL: [Branch; 12] = [
        Branch::Ja,
        Branch::Chuk,
        Branch::In,
        Branch::Myo,
        Branch::Jin,
        Branch::Sa,
        Branch::O,
        Branch::Mi,
        Branch::Sin,
        Branch::Yu,
        Branch::Sul,
        Branch::Hae,
    ];

    /// 汉字写法
    pub fn hanja(&self) -> char {
        match self {
            Branch::Ja => '子',
            Branch::Chuk => '丑',
            Branch::In => '寅',
            Branch::Myo => '卯',
            Branch::Jin => '辰',
            Branch::Sa => '巳',
            Branch::O => '午',
            Branch::Mi => '未',
            Branch::Sin => '申',
            Branch::Yu => '酉',
            Branch::Sul => '戌',
            Branch::Hae => '亥',
        }
    }

    /// 韩文读音
    pub fn hangul(&self) -> &'static str {
        match self {
            Branch::Ja => "자",
            Branch::Chuk => "축",
            Branch::In => "인",
            Branch::Myo => "묘",
            Branch::Jin => "진",
            Branch::Sa => "사",
            Branch::O => "오",
            Branch::Mi => "미",
            Branch::Sin => "신",
            Branch::Yu => "유",
            Branch::Sul => "술",
            Branch::Hae => "해",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_hanja(c: char) -> Option<Branch> {
        Self::ALL.into_iter().find(|b| b.hanja() == c)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hanja())
    }
}

/// 一柱：天干 + 地支
///
/// 序列化为两个汉字的字符串，如 `"癸未"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pillar {
    pub stem: Stem,
    pub branch: Branch,
}

impl Pillar {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem.hanja(), self.branch.hanja())
    }
}

impl From<Pillar> for String {
    fn from(pillar: Pillar) -> Self {
        pillar.to_string()
    }
}

impl TryFrom<String> for Pillar {
    type Error = AnalysisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        split_stem_branch(&value)
    }
}

/// 三柱（年、月、日）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarSet {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
}

impl PillarSet {
    /// 年支、月支、日支（按此顺序）
    pub fn branches(&self) -> [Branch; 3] {
        [self.year.branch, self.month.branch, self.day.branch]
    }
}

/// 按原语法重新序列化
impl fmt::Display for PillarSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}年 {}月 {}日", self.year, self.month, self.day)
    }
}

/// 解析三柱记法
pub fn parse(notation: &str) -> AnalysisResult<PillarSet> {
    let caps = THREE_PILLARS_RE
        .captures(notation.trim_start())
        .ok_or_else(|| {
            AnalysisError::parse(notation, "expected `<stem><branch>年 <stem><branch>月 <stem><branch>日`")
        })?;

    Ok(PillarSet {
        year: split_stem_branch(&caps[1])?,
        month: split_stem_branch(&caps[2])?,
        day: split_stem_branch(&caps[3])?,
    })
}

/// 把一柱拆成天干和地支，必须恰好两个已知字符
pub fn split_stem_branch(pillar: &str) -> AnalysisResult<Pillar> {
    let mut chars = pillar.chars();
    let (stem_char, branch_char) = match (chars.next(), chars.next(), chars.next()) {
        (Some(s), Some(b), None) => (s, b),
        _ => {
            return Err(AnalysisError::parse(
                pillar,
                format!("pillar must be exactly 2 symbols, got {}", pillar.chars().count()),
            ))
        }
    };

    let stem = Stem::from_hanja(stem_char)
        .ok_or_else(|| AnalysisError::parse(pillar, format!("unknown stem `{stem_char}`")))?;
    let branch = Branch::from_hanja(branch_char)
        .ok_or_else(|| AnalysisError::parse(pillar, format!("unknown branch `{branch_char}`")))?;

    Ok(Pillar { stem, branch })
}

/// 日干：五行与部分神煞判定的唯一依据
pub fn day_stem(pillars: &PillarSet) -> Stem {
    pillars.day.stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_sample_notation() {
        let pillars = parse("辛丑年 己亥月 癸未日").unwrap();

        assert_eq!(pillars.year, Pillar::new(Stem::Sin, Branch::Chuk));
        assert_eq!(pillars.month, Pillar::new(Stem::Gi, Branch::Hae));
        assert_eq!(pillars.day, Pillar::new(Stem::Gye, Branch::Mi));
        assert_eq!(day_stem(&pillars), Stem::Gye);
        assert_eq!(day_stem(&pillars).index(), 9);
        assert_eq!(pillars.day.branch.index(), 7);
    }

    #[test]
    fn test_parse_trims_leading_whitespace_and_ignores_trailing_content() {
        let pillars = parse("  甲辰年 乙亥月 辛亥日 (입동)").unwrap();
        assert_eq!(pillars.to_string(), "甲辰年 乙亥月 辛亥日");
    }

    #[test]
    fn test_parse_rejects_unanchored_match() {
        let err = parse("x 辛丑年 己亥月 癸未日").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_symbols() {
        assert!(parse("辛丑年 己亥月 癸X日").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_split_stem_branch_length() {
        assert!(split_stem_branch("癸").is_err());
        assert!(split_stem_branch("癸未日").is_err());
        assert_eq!(
            split_stem_branch("癸未").unwrap(),
            Pillar::new(Stem::Gye, Branch::Mi)
        );
    }

    #[test]
    fn test_split_stem_branch_rejects_swapped_symbols() {
        let err = split_stem_branch("未癸").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }

    #[test]
    fn test_pillar_serializes_as_string() {
        let pillar = Pillar::new(Stem::Gye, Branch::Mi);
        let json = serde_json::to_string(&pillar).unwrap();
        assert_eq!(json, "\"癸未\"");

        let back: Pillar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pillar);
        assert!(serde_json::from_str::<Pillar>("\"癸\"").is_err());
    }

    #[test]
    fn test_hangul_lookup() {
        assert_eq!(Stem::from_hangul("계"), Some(Stem::Gye));
        assert_eq!(Stem::from_hangul("자"), None);
        assert_eq!(Branch::Sin.hangul(), Stem::Sin.hangul());
    }

    fn pillar_strategy() -> impl Strategy<Value = Pillar> {
        (0..10usize, 0..12usize).prop_map(|(s, b)| Pillar::new(Stem::ALL[s], Branch::ALL[b]))
    }

    proptest! {
        #[test]
        fn test_notation_round_trip(
            year in pillar_strategy(),
            month in pillar_strategy(),
            day in pillar_strategy(),
        ) {
            let notation = format!("{year}年 {month}月 {day}日");
            let parsed = parse(&notation).unwrap();
            prop_assert_eq!(parsed.to_string(), notation);
        }
    }
}
