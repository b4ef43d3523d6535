//! SQLite 缓存信号后端
//!
//! 所有条目落在单表 cache_entries，主键为（命名空间，键名），
//! 命名空间遍历按键名正序返回

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use trellis_errors::{AppError, AppResult};
use trellis_ports::{CacheVisitor, Cacher};

use crate::connection::create_pool;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cache_entries (
    ns         TEXT NOT NULL,
    key        TEXT NOT NULL,
    value      TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (ns, key)
)
"#;

/// SQLite Cacher
pub struct SqliteCache {
    pool: SqlitePool,
}

impl SqliteCache {
    /// 打开存储文件并确保表结构就绪
    pub async fn connect(url: &str) -> AppResult<Self> {
        let pool = create_pool(url).await?;
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to init cache schema: {}", e)))?;

        info!(url, "SQLite cache store ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Cacher for SqliteCache {
    async fn set(&self, ns: &str, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cache_entries (ns, key, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (ns, key) DO UPDATE
                SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(ns)
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("SQLite cache set failed: {}", e)))?;
        Ok(())
    }

    async fn get(&self, ns: &str, key: &str) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT value FROM cache_entries WHERE ns = ? AND key = ?",
        )
        .bind(ns)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("SQLite cache get failed: {}", e)))
    }

    async fn delete(&self, ns: &str, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM cache_entries WHERE ns = ? AND key = ?")
            .bind(ns)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("SQLite cache delete failed: {}", e)))?;
        Ok(())
    }

    async fn exists(&self, ns: &str, key: &str) -> AppResult<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM cache_entries WHERE ns = ? AND key = ?",
        )
        .bind(ns)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("SQLite cache exists failed: {}", e)))?;
        Ok(found.is_some())
    }

    async fn iterate(&self, ns: &str, visitor: &mut CacheVisitor<'_>) -> AppResult<()> {
        let entries = sqlx::query_as::<_, (String, String)>(
            "SELECT key, value FROM cache_entries WHERE ns = ? ORDER BY key",
        )
        .bind(ns)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("SQLite cache iterate failed: {}", e)))?;

        for (key, value) in &entries {
            if !visitor(key, value) {
                break;
            }
        }
        Ok(())
    }

    async fn close(&self) -> AppResult<()> {
        self.pool.close().await;
        Ok(())
    }
}
