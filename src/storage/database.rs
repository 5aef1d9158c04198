//! 数据库存储模块
//!
//! 使用SQLite存储万岁历数据

use crate::core::calendar::CalendarRow;
use anyhow::Result;
use rusqlite::{params, Connection};
use std::path::Path;

/// 万岁历数据库
pub struct CalendarDatabase {
    conn: Connection,
}

impl CalendarDatabase {
    /// 打开或创建数据库
    pub fn open(path: &Path) -> Result<Self> {
        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_tables()?;
        Ok(db)
    }

    /// 初始化表结构
    fn init_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- 万岁历表（rowid 保持导入顺序）
            CREATE TABLE IF NOT EXISTS calendar (
                solar_date TEXT PRIMARY KEY,
                solar_ganzi TEXT NOT NULL,
                solar_term TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// 批量导入，已存在的日期会被覆盖
    pub fn import(&mut self, rows: &[CalendarRow]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO calendar (solar_date, solar_ganzi, solar_term)
                VALUES (?1, ?2, ?3)
                "#,
            )?;
            for row in rows {
                stmt.execute(params![row.solar_date, row.solar_ganzi, row.solar_term])?;
            }
        }
        tx.commit()?;

        tracing::info!("已导入 {} 行万岁历数据", rows.len());
        Ok(rows.len())
    }

    /// 读取全部数据行
    pub fn load_rows(&self) -> Result<Vec<CalendarRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT solar_date, solar_ganzi, solar_term
            FROM calendar
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(CalendarRow {
                solar_date: row.get(0)?,
                solar_ganzi: row.get(1)?,
                solar_term: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 数据行数
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM calendar", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
