//! 配置文件管理模块
//!
//! 配置是 JSON 文件。`dataset_path` 写相对路径时，以配置文件所在目录为基准，
//! 这样数据集可以和配置放在同一个目录里一起搬动。

use crate::core::models::AppConfig;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// 配置管理器
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// 获取默认配置路径
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "pawstars", "PawStars")
            .map(|d| d.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// 加载配置，文件不存在时返回默认配置
    pub fn load(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            tracing::debug!("配置文件不存在，使用默认配置: {}", self.config_path.display());
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("读取配置文件失败: {}", self.config_path.display()))?;
        let mut config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("配置文件格式错误: {}", self.config_path.display()))?;

        validate(&config)
            .with_context(|| format!("配置无效: {}", self.config_path.display()))?;
        config.dataset_path = config.dataset_path.map(|p| self.resolve(p));
        Ok(config)
    }

    /// 保存配置
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        validate(config)?;

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;
        tracing::info!("配置已保存: {}", self.config_path.display());
        Ok(())
    }

    /// 重置为默认配置
    pub fn reset(&self) -> Result<AppConfig> {
        let config = AppConfig::default();
        self.save(&config)?;
        Ok(config)
    }

    fn resolve(&self, path: PathBuf) -> PathBuf {
        match self.config_path.parent() {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.default_breed.trim().is_empty() {
        bail!("default_breed 不能为空");
    }
    if config.birth_policy.min_year < 1 {
        bail!("birth_policy.min_year 必须是正数: {}", config.birth_policy.min_year);
    }
    Ok(())
}
