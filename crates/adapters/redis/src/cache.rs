//! Redis 缓存信号后端
//!
//! 键以「命名空间:键名」形式落到同一个逻辑库，
//! 命名空间遍历依赖 SCAN 游标加 MATCH 模式

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use trellis_errors::{AppError, AppResult};
use trellis_ports::{CacheVisitor, Cacher, cache_key};

/// 每轮 SCAN 的批量大小
const SCAN_COUNT: usize = 100;

/// Redis Cacher
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Cacher for RedisCache {
    async fn set(&self, ns: &str, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.set(cache_key(ns, key), value)
            .await
            .map_err(|e| AppError::external_service(format!("Redis set failed: {}", e)))
    }

    async fn get(&self, ns: &str, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(cache_key(ns, key))
            .await
            .map_err(|e| AppError::external_service(format!("Redis get failed: {}", e)))
    }

    async fn delete(&self, ns: &str, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del(cache_key(ns, key))
            .await
            .map_err(|e| AppError::external_service(format!("Redis delete failed: {}", e)))
    }

    async fn exists(&self, ns: &str, key: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        conn.exists(cache_key(ns, key))
            .await
            .map_err(|e| AppError::external_service(format!("Redis exists failed: {}", e)))
    }

    async fn iterate(&self, ns: &str, visitor: &mut CacheVisitor<'_>) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let prefix = cache_key(ns, "");
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(|e| AppError::external_service(format!("Redis scan failed: {}", e)))?;

            for full_key in keys {
                let value: Option<String> = conn
                    .get(&full_key)
                    .await
                    .map_err(|e| AppError::external_service(format!("Redis get failed: {}", e)))?;
                // 键可能在扫描后被并发删除
                let Some(value) = value else { continue };
                let key = full_key.strip_prefix(&prefix).unwrap_or(&full_key);
                if !visitor(key, &value) {
                    return Ok(());
                }
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(())
    }

    async fn close(&self) -> AppResult<()> {
        // 连接管理器随 drop 释放
        Ok(())
    }
}
