//! 缓存信号通道 trait 定义
//!
//! 命名空间化的键值存储：业务侧只依赖本契约，
//! 嵌入式持久化后端与远端共享后端可互换

use async_trait::async_trait;
use trellis_errors::AppResult;

/// 命名空间与键之间的分隔符
pub const CACHE_KEY_DELIMITER: &str = ":";

/// 组合命名空间和键为后端存储键
pub fn cache_key(ns: &str, key: &str) -> String {
    format!("{ns}{CACHE_KEY_DELIMITER}{key}")
}

/// 遍历访问器，返回 false 提前终止遍历
pub type CacheVisitor<'a> = dyn FnMut(&str, &str) -> bool + Send + 'a;

/// 命名空间化缓存 trait
///
/// set 覆盖写，同键以最后一次写入为准；get 缺失返回 None 而非错误
#[async_trait]
pub trait Cacher: Send + Sync {
    /// 写入缓存值
    async fn set(&self, ns: &str, key: &str, value: &str) -> AppResult<()>;

    /// 读取缓存值
    async fn get(&self, ns: &str, key: &str) -> AppResult<Option<String>>;

    /// 删除缓存值
    async fn delete(&self, ns: &str, key: &str) -> AppResult<()>;

    /// 检查键是否存在
    async fn exists(&self, ns: &str, key: &str) -> AppResult<bool>;

    /// 正向遍历命名空间内的全部键值
    async fn iterate(&self, ns: &str, visitor: &mut CacheVisitor<'_>) -> AppResult<()>;

    /// 释放后端资源，无需释放的后端为空操作
    async fn close(&self) -> AppResult<()>;
}
