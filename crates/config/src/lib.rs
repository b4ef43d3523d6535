//! trellis-config - 配置加载库

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use thiserror::Error;

use secrecy::Secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    // 根据环境自动调整连接池大小
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

/// 缓存信号通道后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// 嵌入式持久化存储（SQLite 文件）
    #[default]
    Sqlite,
    /// 远端共享存储（Redis）
    Redis,
}

/// 缓存信号通道配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,
    /// redis 后端必填
    pub redis_url: Option<Secret<String>>,
}

fn default_sqlite_path() -> String {
    "data/trellis-cache.db".to_string()
}

/// 菜单管理配置
#[derive(Debug, Clone, Deserialize)]
pub struct MenuConfig {
    /// 全局禁止删除菜单
    #[serde(default)]
    pub deny_delete: bool,
    /// 声明式菜单文件路径，缺省表示不做引导导入
    pub import_file: Option<String>,
    #[serde(default = "default_sync_namespace")]
    pub sync_namespace: String,
    #[serde(default = "default_sync_key")]
    pub sync_key: String,
}

fn default_sync_namespace() -> String {
    "rbac".to_string()
}

fn default_sync_key() -> String {
    "last_change".to_string()
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub menu: MenuConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("").split("_"))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

#[cfg(test)]
mod tests;
