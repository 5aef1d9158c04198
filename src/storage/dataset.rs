//! 万岁历数据集载入模块
//!
//! 按路径扩展名选择 CSV、JSON 或 SQLite 数据源；数据源不可用时按配置退回内置样例数据。

use crate::core::calendar::{CalendarRow, CalendarTable};
use crate::core::context::AnalysisContext;
use crate::core::models::AppConfig;
use crate::storage::database::CalendarDatabase;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::sync::Arc;

/// 数据源格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Json,
    Sqlite,
}

impl DatasetFormat {
    /// 根据扩展名判断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(DatasetFormat::Csv),
            "json" => Some(DatasetFormat::Json),
            "db" | "sqlite" | "sqlite3" => Some(DatasetFormat::Sqlite),
            _ => None,
        }
    }
}

/// 内置样例数据
pub fn sample_rows() -> Vec<CalendarRow> {
    vec![
        CalendarRow::new("2021-12-01", "辛丑年 己亥月 癸未日", ""),
        CalendarRow::new("2021-12-02", "辛丑年 己亥月 甲申日", ""),
        CalendarRow::new("2021-12-03", "辛丑年 己亥月 乙酉日", ""),
        CalendarRow::new("2022-01-01", "辛丑年 庚子月 戊午日", ""),
        CalendarRow::new("2022-02-04", "壬寅年 辛丑月 甲申日", "입춘"),
        CalendarRow::new("2023-01-01", "壬寅年 壬子月 癸卯日", ""),
        CalendarRow::new("2023-12-01", "癸卯年 癸亥月 丁巳日", ""),
        CalendarRow::new("2024-01-01", "癸卯年 甲子月 戊申日", ""),
        CalendarRow::new("2024-12-01", "甲辰年 乙亥月 辛亥日", ""),
    ]
}

/// 读取 CSV 数据集（表头 `solar_date,solar_ganzi,jeolki`，节气列可缺省）
pub fn load_csv(path: &Path) -> Result<Vec<CalendarRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("读取万岁历数据失败: {}", path.display()))?;

    reader
        .deserialize()
        .collect::<Result<Vec<CalendarRow>, _>>()
        .with_context(|| format!("解析万岁历数据失败: {}", path.display()))
}

/// 读取 JSON 数组格式的数据集
pub fn load_json(path: &Path) -> Result<Vec<CalendarRow>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("读取万岁历数据失败: {}", path.display()))?;
    let rows = serde_json::from_str(&content)
        .with_context(|| format!("解析万岁历数据失败: {}", path.display()))?;
    Ok(rows)
}

/// 写出 JSON 数据集
pub fn save_json(path: &Path, rows: &[CalendarRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(rows)?)?;
    Ok(())
}

/// 从指定路径读取数据行
pub fn load_rows_from(path: &Path) -> Result<Vec<CalendarRow>> {
    if !path.exists() {
        return Err(anyhow!("万岁历数据不存在: {}", path.display()));
    }

    match DatasetFormat::from_path(path) {
        Some(DatasetFormat::Csv) => load_csv(path),
        Some(DatasetFormat::Json) => load_json(path),
        Some(DatasetFormat::Sqlite) => CalendarDatabase::open(path)?.load_rows(),
        None => Err(anyhow!("不支持的万岁历数据格式: {}", path.display())),
    }
}

/// 按配置读取数据行
pub fn load_rows(config: &AppConfig) -> Result<Vec<CalendarRow>> {
    let loaded = match &config.dataset_path {
        Some(path) => load_rows_from(path),
        None => Err(anyhow!("未配置万岁历数据路径")),
    };

    match loaded {
        Ok(rows) => Ok(rows),
        Err(e) if config.sample_fallback => {
            tracing::warn!("万岁历数据不可用，使用内置样例数据: {:#}", e);
            Ok(sample_rows())
        }
        Err(e) => Err(e),
    }
}

/// 按配置构建数据表
pub fn load_table(config: &AppConfig) -> Result<CalendarTable> {
    Ok(CalendarTable::from_rows(load_rows(config)?))
}

/// 按配置构建分析上下文
pub fn load_context(config: &AppConfig) -> Result<AnalysisContext> {
    let table = load_table(config)?;
    Ok(AnalysisContext::new(Arc::new(table))
        .with_policy(config.birth_policy)
        .with_default_breed(config.default_breed.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DatasetFormat::from_path(Path::new("a/b.JSON")),
            Some(DatasetFormat::Json)
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("calendar.sqlite3")),
            Some(DatasetFormat::Sqlite)
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("calendar.csv")),
            Some(DatasetFormat::Csv)
        );
        assert_eq!(DatasetFormat::from_path(Path::new("calendar.txt")), None);
        assert_eq!(DatasetFormat::from_path(Path::new("calendar")), None);
    }

    #[test]
    fn test_json_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("calendar.json");

        save_json(&path, &sample_rows()).unwrap();
        let rows = load_json(&path).unwrap();
        assert_eq!(rows, sample_rows());
    }

    #[test]
    fn test_csv_dataset_with_empty_term() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manseryeok.csv");
        std::fs::write(
            &path,
            "solar_date,solar_ganzi,jeolki\n\
             2021-12-01,辛丑年 己亥月 癸未日,\n\
             2022-02-04,壬寅年 辛丑月 甲申日,입춘\n",
        )
        .unwrap();

        let rows = load_rows_from(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].solar_ganzi, "辛丑年 己亥月 癸未日");

        let table = CalendarTable::from_rows(rows);
        assert_eq!(table.resolve("2021-12-01").unwrap().solar_term, "");
        assert_eq!(table.resolve("2022-02-04").unwrap().solar_term, "입춘");
    }

    #[test]
    fn test_csv_dataset_without_term_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manseryeok.csv");
        std::fs::write(
            &path,
            "solar_date,solar_ganzi\n2021-12-02,辛丑年 己亥月 甲申日\n",
        )
        .unwrap();

        let config = AppConfig {
            dataset_path: Some(path),
            sample_fallback: false,
            ..Default::default()
        };
        let table = load_table(&config).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("2021-12-02").unwrap().solar_term, "");
    }

    #[test]
    fn test_missing_dataset_falls_back_to_sample() {
        let config = AppConfig {
            dataset_path: Some(PathBuf::from("/nonexistent/calendar.json")),
            ..Default::default()
        };
        let table = load_table(&config).unwrap();
        assert_eq!(table.len(), sample_rows().len());
    }

    #[test]
    fn test_missing_dataset_without_fallback_fails() {
        let config = AppConfig {
            dataset_path: Some(PathBuf::from("/nonexistent/calendar.json")),
            sample_fallback: false,
            ..Default::default()
        };
        assert!(load_table(&config).is_err());
    }

    #[test]
    fn test_load_context_applies_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("calendar.json");
        save_json(&path, &sample_rows()[..2]).unwrap();

        let mut config = AppConfig {
            dataset_path: Some(path),
            sample_fallback: false,
            ..Default::default()
        };
        config.birth_policy.min_year = 2000;
        config.default_breed = "푸들".to_string();

        let context = load_context(&config).unwrap();
        assert_eq!(context.table.len(), 2);
        assert_eq!(context.policy.min_year, 2000);
        assert_eq!(context.default_breed, "푸들");
    }
}
