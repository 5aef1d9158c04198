//! 万岁历查询模块
//!
//! 把公历日期映射到当天的干支记法。数据在启动时一次性载入，之后只读，
//! 可以被多个线程同时查询。查询是精确匹配，不做插值也不找最近日期。

use crate::core::error::{AnalysisError, AnalysisResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 请求与数据集中的日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 数据表为空时返回的日期范围
pub const FALLBACK_RANGE: (&str, &str) = ("2021-12-01", "2024-12-01");

/// 数据集中的一行（外部格式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRow {
    pub solar_date: String,
    pub solar_ganzi: String,
    /// 节气，可缺省或为空
    #[serde(default, alias = "jeolki")]
    pub solar_term: Option<String>,
}

impl CalendarRow {
    pub fn new(solar_date: &str, solar_ganzi: &str, solar_term: &str) -> Self {
        Self {
            solar_date: solar_date.to_string(),
            solar_ganzi: solar_ganzi.to_string(),
            solar_term: Some(solar_term.to_string()),
        }
    }
}

/// 万岁历记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRecord {
    #[serde(rename = "solar_date")]
    pub date: NaiveDate,
    #[serde(rename = "solar_ganzi")]
    pub pillar_notation: String,
    /// 节气（没有时为空字符串）
    pub solar_term: String,
}

/// 可查询的日期范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// 按 `YYYY-MM-DD` 解析日期
///
/// 只接受规范写法：不补零、带符号或带空白的输入都视为格式错误。
pub fn parse_date(field: &'static str, value: &str) -> AnalysisResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| AnalysisError::invalid(field, value, format!("expected YYYY-MM-DD ({e})")))?;

    if date.format(DATE_FORMAT).to_string() != value {
        return Err(AnalysisError::invalid(field, value, "expected YYYY-MM-DD"));
    }
    Ok(date)
}

/// 万岁历数据表（只读）
#[derive(Debug, Clone)]
pub struct CalendarTable {
    /// 记录（保持数据集原顺序）
    records: Vec<CalendarRecord>,
    /// 日期 → 记录下标
    index: HashMap<NaiveDate, usize>,
    range: DateRange,
}

impl CalendarTable {
    /// 从数据集行构建数据表
    ///
    /// 日期不合法的行会被跳过；重复日期只保留第一行。
    pub fn from_rows(rows: impl IntoIterator<Item = CalendarRow>) -> Self {
        let mut records = Vec::new();
        let mut index = HashMap::new();

        for row in rows {
            let date = match NaiveDate::parse_from_str(row.solar_date.trim(), DATE_FORMAT) {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!("跳过日期不合法的万岁历行 {:?}: {}", row.solar_date, e);
                    continue;
                }
            };

            if index.contains_key(&date) {
                tracing::warn!("万岁历日期重复，保留第一行: {}", date);
                continue;
            }

            index.insert(date, records.len());
            records.push(CalendarRecord {
                date,
                pillar_notation: row.solar_ganzi,
                solar_term: row.solar_term.unwrap_or_default(),
            });
        }

        let range = Self::compute_range(&records);
        tracing::info!(
            "万岁历数据载入完成: {} 行 ({} ~ {})",
            records.len(),
            range.start_date,
            range.end_date
        );

        Self {
            records,
            index,
            range,
        }
    }

    fn compute_range(records: &[CalendarRecord]) -> DateRange {
        let start = records.iter().map(|r| r.date).min();
        let end = records.iter().map(|r| r.date).max();
        match (start, end) {
            (Some(start_date), Some(end_date)) => DateRange {
                start_date,
                end_date,
            },
            _ => DateRange {
                start_date: fallback_date(FALLBACK_RANGE.0),
                end_date: fallback_date(FALLBACK_RANGE.1),
            },
        }
    }

    /// 查询某天的记录
    pub fn resolve(&self, date: &str) -> AnalysisResult<&CalendarRecord> {
        let date = parse_date("date", date)?;
        self.resolve_date(date)
    }

    /// 以已解析的日期查询
    pub fn resolve_date(&self, date: NaiveDate) -> AnalysisResult<&CalendarRecord> {
        self.index
            .get(&date)
            .map(|&i| &self.records[i])
            .ok_or_else(|| AnalysisError::NotFound {
                date: date.format(DATE_FORMAT).to_string(),
            })
    }

    /// 可查询的日期范围（载入时计算）
    pub fn available_range(&self) -> DateRange {
        self.range
    }

    /// 干支记法包含 `pattern` 的全部日期，按数据集顺序
    pub fn search_by_pattern(&self, pattern: &str) -> Vec<NaiveDate> {
        self.records
            .iter()
            .filter(|r| r.pillar_notation.contains(pattern))
            .map(|r| r.date)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn fallback_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap_or_default()
}
