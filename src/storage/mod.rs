//! 存储模块 - 配置文件与万岁历数据源

pub mod config;
pub mod database;
pub mod dataset;
