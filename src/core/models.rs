//! 核心数据模型定义
//!
//! 请求输入、分析结果和应用配置。分析结果只在单次请求内存在，不做持久化。

use crate::core::calendar::DateRange;
use crate::core::elements::{CompatibilityResult, DEFAULT_BREED};
use crate::core::error::AnalysisError;
use crate::core::ganzi::PillarSet;
use crate::core::shinsal::{MarkerFlags, MarkerResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// 性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(AnalysisError::invalid(
                "gender",
                other,
                "must be `male` or `female`",
            )),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// 分析请求：宠物身份与出生日期
///
/// 字段保持调用方原样的字符串，由分析器统一校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetProfile {
    pub name: String,
    pub breed: String,
    pub gender: String,
    pub birth_date: String,
}

impl PetProfile {
    pub fn new(name: &str, breed: &str, gender: &str, birth_date: &str) -> Self {
        Self {
            name: name.to_string(),
            breed: breed.to_string(),
            gender: gender.to_string(),
            birth_date: birth_date.to_string(),
        }
    }
}

/// 궁합 / 运势只需要名字和生日
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetRef {
    pub name: String,
    pub birth_date: String,
}

impl PetRef {
    pub fn new(name: &str, birth_date: &str) -> Self {
        Self {
            name: name.to_string(),
            birth_date: birth_date.to_string(),
        }
    }
}

/// 综合分析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// 稳定标识（名字 + 生日的hash）
    pub id: String,
    pub name: String,
    pub breed: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub pillars: PillarSet,
    /// 日干（韩文读音）
    pub day_stem: String,
    /// 五行显示形式，如 `수(水)`
    pub five_element: String,
    pub temperament: String,
    pub activity_tip: String,
    /// 神煞 → 是否命中（规则顺序）
    pub shinsal: MarkerFlags,
    /// 神煞详情（规则顺序）
    pub shinsal_details: Vec<MarkerResult>,
    pub shinsal_summary: String,
    pub analysis_date: DateTime<Utc>,
    /// 出生当天的节气
    pub solar_term: String,
}

/// 日期查询结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PillarsLookup {
    pub solar_date: NaiveDate,
    pub solar_ganzi: String,
    pub pillars: PillarSet,
    pub solar_term: String,
}

/// 궁합报告中的单只宠物
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityPet {
    pub name: String,
    pub element: String,
}

/// 궁합报告
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityReport {
    pub pet1: CompatibilityPet,
    pub pet2: CompatibilityPet,
    pub compatibility: CompatibilityResult,
    pub analysis_date: DateTime<Utc>,
}

/// 每日运势
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyFortune {
    pub pet_name: String,
    pub target_date: NaiveDate,
    pub pet_day_stem: String,
    pub today_day_stem: String,
    pub fortune_message: String,
    pub daily_pillars: PillarSet,
    pub solar_term: String,
}

/// 出生日期策略
///
/// 下限是应用层策略，与万岁历实际覆盖范围无关。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDatePolicy {
    /// 最早允许的出生年份
    pub min_year: i32,
    /// 出生日期最多晚于今天多少年
    pub max_future_years: u32,
}

impl Default for BirthDatePolicy {
    fn default() -> Self {
        Self {
            min_year: 1990,
            max_future_years: 1,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 万岁历数据路径（.json / .db / .sqlite）
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
    /// 数据不可用时是否使用内置样例数据
    #[serde(default = "default_true")]
    pub sample_fallback: bool,
    #[serde(default)]
    pub birth_policy: BirthDatePolicy,
    /// 궁합 / 运势中间分析使用的品种
    #[serde(default = "default_breed")]
    pub default_breed: String,
}

fn default_true() -> bool {
    true
}

fn default_breed() -> String {
    DEFAULT_BREED.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            sample_fallback: true,
            birth_policy: BirthDatePolicy::default(),
            default_breed: default_breed(),
        }
    }
}

/// 健康检查信息
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatus {
    pub record_count: usize,
    pub data_range: DateRange,
}
