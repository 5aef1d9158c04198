//! PawStars - 万岁历三柱宠物分析
//!
//! 核心设计原则：
//! - 三柱只查表，不做天文推算
//! - 万岁历数据载入一次，之后只读
//! - 所有分析都是对静态数据的纯函数，不缓存请求结果

pub mod core;
pub mod storage;

pub use crate::core::analyzer::PetAnalyzer;
pub use crate::core::error::{AnalysisError, AnalysisResult, ErrorKind};
