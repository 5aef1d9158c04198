//! 神煞规则引擎模块
//!
//! 按固定顺序对三柱逐条判定神煞（역마살、도화살、화개살、문창귀인、천덕귀인），
//! 再把命中的神煞汇总成一句话。
//! 规则内容是静态的，描述和效果文本与是否命中无关，只有 `present` 是计算出来的。

use crate::core::ganzi::{day_stem, Branch, PillarSet, Stem};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Index;

/// 没有任何神煞时的汇总文本
pub const BALANCED_SUMMARY: &str =
    "특별한 신살은 없지만, 안정적이고 균형잡힌 성향을 가지고 있습니다";

/// 汇总里最多展开的效果条数
const SUMMARY_EFFECT_LIMIT: usize = 2;

/// 神煞判定条件
#[derive(Debug, Clone, Copy)]
pub enum MarkerCondition {
    /// 年支、月支、日支任一落在集合内
    AnyBranchIn(&'static [Branch]),
    /// 日干落在集合内
    DayStemIn(&'static [Stem]),
    /// 按月支查表得到允许的日干集合；月支不在表中视为不命中
    MonthBranchDayStem(&'static [(Branch, &'static [Stem])]),
}

impl MarkerCondition {
    /// 检查三柱是否满足此条件
    pub fn matches(&self, pillars: &PillarSet) -> bool {
        match self {
            MarkerCondition::AnyBranchIn(branches) => {
                pillars.branches().iter().any(|b| branches.contains(b))
            }
            MarkerCondition::DayStemIn(stems) => stems.contains(&day_stem(pillars)),
            MarkerCondition::MonthBranchDayStem(table) => table
                .iter()
                .find(|(month, _)| *month == pillars.month.branch)
                .map(|(_, stems)| stems.contains(&day_stem(pillars)))
                .unwrap_or(false),
        }
    }
}

/// 神煞规则定义
#[derive(Debug, Clone, Copy)]
pub struct MarkerRule {
    /// 规则名称（韩文，用作结果键）
    pub name: &'static str,
    pub condition: MarkerCondition,
    pub description: &'static str,
    pub effect: &'static str,
}

/// 单条神煞的判定结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerResult {
    pub name: String,
    pub present: bool,
    pub description: String,
    pub effect: String,
}

/// 神煞名称 → 是否命中，保持规则顺序
///
/// 序列化为 JSON 对象，键的顺序与规则顺序一致。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerFlags(Vec<(String, bool)>);

impl MarkerFlags {
    pub fn get(&self, name: &str) -> Option<bool> {
        self.0.iter().find(|(n, _)| n == name).map(|&(_, present)| present)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(name, present)| (name.as_str(), *present))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a MarkerResult> for MarkerFlags {
    fn from_iter<I: IntoIterator<Item = &'a MarkerResult>>(iter: I) -> Self {
        Self(iter.into_iter().map(|r| (r.name.clone(), r.present)).collect())
    }
}

impl Index<&str> for MarkerFlags {
    type Output = bool;

    fn index(&self, name: &str) -> &bool {
        match self.0.iter().find(|(n, _)| n == name) {
            Some((_, present)) => present,
            None => panic!("unknown marker: {name}"),
        }
    }
}

impl Serialize for MarkerFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, present) in &self.0 {
            map.serialize_entry(name, present)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MarkerFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagsVisitor;

        impl<'de> Visitor<'de> for FlagsVisitor {
            type Value = MarkerFlags;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of marker name to bool")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MarkerFlags, A::Error> {
                let mut flags = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, present)) = access.next_entry::<String, bool>()? {
                    flags.push((name, present));
                }
                Ok(MarkerFlags(flags))
            }
        }

        deserializer.deserialize_map(FlagsVisitor)
    }
}

/// 神煞汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSummary {
    /// 命中的神煞名称（保持规则顺序）
    pub active: Vec<String>,
    pub total_count: usize,
    pub summary: String,
}

const YEOKMA_BRANCHES: &[Branch] = &[Branch::In, Branch::Sin, Branch::Sa, Branch::Hae];
const DOHWA_BRANCHES: &[Branch] = &[Branch::Ja, Branch::O, Branch::Myo, Branch::Yu];
const HWAGAE_BRANCHES: &[Branch] = &[Branch::Jin, Branch::Sul, Branch::Chuk, Branch::Mi];
const MUNCHANG_STEMS: &[Stem] = &[Stem::Gap, Stem::Eul, Stem::Byeong, Stem::Jeong];

/// 천덕귀인：月支 → 日干。卯、午、酉、子月的천덕落在地支上，不参与日干判定。
const CHEONDEOK_TABLE: &[(Branch, &[Stem])] = &[
    (Branch::In, &[Stem::Jeong]),
    (Branch::Jin, &[Stem::Im]),
    (Branch::Sa, &[Stem::Sin]),
    (Branch::Mi, &[Stem::Gap]),
    (Branch::Sin, &[Stem::Gye]),
    (Branch::Sul, &[Stem::Byeong]),
    (Branch::Hae, &[Stem::Eul]),
    (Branch::Chuk, &[Stem::Gyeong]),
];

/// 神煞规则引擎
pub struct ShinsalEngine {
    /// 规则列表（判定与输出顺序）
    rules: Vec<MarkerRule>,
}

impl Default for ShinsalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ShinsalEngine {
    /// 创建新的规则引擎
    pub fn new() -> Self {
        let mut engine = Self { rules: Vec::new() };

        // 加载内置规则
        engine.load_builtin_rules();
        engine
    }

    /// 加载内置规则
    fn load_builtin_rules(&mut self) {
        let builtin_rules = [
            MarkerRule {
                name: "역마살",
                condition: MarkerCondition::AnyBranchIn(YEOKMA_BRANCHES),
                description: "인·신·사·해 지지가 있어 이동과 변화의 기운이 강합니다",
                effect: "활동량이 많고 산책과 나들이를 무척 좋아합니다.",
            },
            MarkerRule {
                name: "도화살",
                condition: MarkerCondition::AnyBranchIn(DOHWA_BRANCHES),
                description: "자·오·묘·유 지지가 있어 사람을 끌어당기는 매력이 있습니다",
                effect: "어디서나 귀여움을 독차지하는 인기쟁이입니다.",
            },
            MarkerRule {
                name: "화개살",
                condition: MarkerCondition::AnyBranchIn(HWAGAE_BRANCHES),
                description: "진·술·축·미 지지가 있어 예술적이고 사색적인 기운이 있습니다",
                effect: "혼자만의 시간도 즐기는 독립적이고 감성적인 면이 있습니다.",
            },
            MarkerRule {
                name: "문창귀인",
                condition: MarkerCondition::DayStemIn(MUNCHANG_STEMS),
                description: "일간이 갑·을·병·정으로 총명함과 학습의 기운이 있습니다",
                effect: "눈치가 빠르고 새로운 훈련을 금방 익힙니다.",
            },
            MarkerRule {
                name: "천덕귀인",
                condition: MarkerCondition::MonthBranchDayStem(CHEONDEOK_TABLE),
                description: "월지와 일간의 조합으로 하늘의 덕을 타고났습니다",
                effect: "위기가 와도 잘 넘기는 타고난 복이 있습니다.",
            },
        ];

        self.rules.extend(builtin_rules);
    }

    /// 获取所有规则
    pub fn rules(&self) -> &[MarkerRule] {
        &self.rules
    }

    /// 按规则顺序判定全部神煞
    pub fn evaluate(&self, pillars: &PillarSet) -> Vec<MarkerResult> {
        self.rules
            .iter()
            .map(|rule| MarkerResult {
                name: rule.name.to_string(),
                present: rule.condition.matches(pillars),
                description: rule.description.to_string(),
                effect: rule.effect.to_string(),
            })
            .collect()
    }
}

/// 汇总神煞结果
///
/// 只展开前两条命中神煞的效果（按输入顺序，不按轻重排序），
/// 超过两条时追加总数。
pub fn summarize(results: &[MarkerResult]) -> MarkerSummary {
    let active: Vec<&MarkerResult> = results.iter().filter(|r| r.present).collect();

    let summary = if active.is_empty() {
        BALANCED_SUMMARY.to_string()
    } else {
        let mut summary = active
            .iter()
            .take(SUMMARY_EFFECT_LIMIT)
            .map(|r| r.effect.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        if active.len() > SUMMARY_EFFECT_LIMIT {
            summary.push_str(&format!(
                " 등 총 {}가지 특별한 성향을 가지고 있습니다",
                active.len()
            ));
        }
        summary
    };

    MarkerSummary {
        active: active.iter().map(|r| r.name.clone()).collect(),
        total_count: active.len(),
        summary,
    }
}
