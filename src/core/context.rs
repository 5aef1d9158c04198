//! 分析上下文
//!
//! 万岁历数据表和策略参数放在显式构造的上下文里，由调用方传给分析器。
//! 数据表载入一次后只读，用 `Arc` 在线程间共享。
//! 无法在各层之间传递上下文的边界层可以用 `shared_table` 做进程级的一次性初始化。

use crate::core::calendar::CalendarTable;
use crate::core::elements::DEFAULT_BREED;
use crate::core::models::BirthDatePolicy;
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use once_cell::sync::OnceCell;
use std::sync::Arc;

static SHARED_TABLE: OnceCell<Arc<CalendarTable>> = OnceCell::new();

/// 进程级万岁历数据表
///
/// 第一次调用时执行 `load`，之后的调用直接返回同一份数据，`load` 不再执行。
/// 并发的首次调用只有一个会真正载入。载入失败不会缓存，下次调用会重试。
pub fn shared_table<F>(load: F) -> Result<Arc<CalendarTable>>
where
    F: FnOnce() -> Result<CalendarTable>,
{
    SHARED_TABLE
        .get_or_try_init(|| load().map(Arc::new))
        .cloned()
}

/// 时钟，测试时可替换为固定日期
pub trait Clock: Send + Sync {
    /// 今天（用于出生日期策略和默认运势日期）
    fn today(&self) -> NaiveDate;
    /// 分析时间戳
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟（本地日期）
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定时钟
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now(&self) -> DateTime<Utc> {
        self.today
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_default()
    }
}

/// 分析上下文
#[derive(Clone)]
pub struct AnalysisContext {
    pub table: Arc<CalendarTable>,
    pub policy: BirthDatePolicy,
    pub default_breed: String,
    pub clock: Arc<dyn Clock>,
}

impl AnalysisContext {
    /// 使用默认策略和系统时钟
    pub fn new(table: Arc<CalendarTable>) -> Self {
        Self {
            table,
            policy: BirthDatePolicy::default(),
            default_breed: DEFAULT_BREED.to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_policy(mut self, policy: BirthDatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_breed(mut self, breed: impl Into<String>) -> Self {
        self.default_breed = breed.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
