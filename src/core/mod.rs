//! Core模块 - 包含所有核心业务逻辑

pub mod analyzer;
pub mod calendar;
pub mod context;
pub mod elements;
pub mod error;
pub mod ganzi;
pub mod models;
pub mod shinsal;
