//! SQLite 连接管理

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use trellis_errors::{AppError, AppResult};

/// 创建 SQLite 连接池
///
/// 固定单连接：内存库（`sqlite::memory:`）的每个连接都是一个独立数据库
pub async fn create_pool(url: &str) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| AppError::database(format!("Invalid SQLite URL: {}", e)))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| AppError::database(format!("Failed to open SQLite store: {}", e)))
}
