//! 分析错误类型
//!
//! 核心层的所有失败都归入这里的分类，边界层（HTTP、CLI）按 `ErrorKind`
//! 自行决定状态码和提示文案。

use thiserror::Error;

/// 核心分析过程中可能出现的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// 调用方输入不合法（日期格式、必填字段、枚举值、出生年份策略）
    #[error("invalid {field} `{value}`: {reason}")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// 万岁历中没有该日期
    #[error("no calendar record for date {date}")]
    NotFound { date: String },

    /// 干支记法不符合语法，通常意味着数据集损坏
    #[error("cannot parse pillar notation `{input}`: {reason}")]
    Parse { input: String, reason: String },

    /// 天干不在已知字母表中
    #[error("unknown heavenly stem `{0}`")]
    UnknownStem(String),

    /// 五行不在已知集合中
    #[error("unknown element `{0}`")]
    UnknownElement(String),
}

/// 错误种类（不带负载），供边界层做映射
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Parse,
    UnknownStem,
    UnknownElement,
}

impl ErrorKind {
    /// 是否属于服务端内部故障（而不是用户输入问题）
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ErrorKind::Parse | ErrorKind::UnknownStem | ErrorKind::UnknownElement
        )
    }
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::InvalidInput { .. } => ErrorKind::InvalidInput,
            AnalysisError::NotFound { .. } => ErrorKind::NotFound,
            AnalysisError::Parse { .. } => ErrorKind::Parse,
            AnalysisError::UnknownStem(_) => ErrorKind::UnknownStem,
            AnalysisError::UnknownElement(_) => ErrorKind::UnknownElement,
        }
    }

    pub(crate) fn invalid(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        AnalysisError::InvalidInput {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// 核心层统一结果类型
pub type AnalysisResult<T> = Result<T, AnalysisError>;
