//! trellis-errors - 统一错误处理
//!
//! 全部业务与基础设施错误收敛到一个枚举，
//! 调用方按变体决定是否可恢复

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 目标记录不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// 输入不合法或违反业务规则
    #[error("Validation error: {0}")]
    Validation(String),

    /// 与既有数据冲突，通常由唯一约束触发
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 进程内部状态异常
    #[error("Internal error: {0}")]
    Internal(String),

    /// 数据库访问失败
    #[error("Database error: {0}")]
    Database(String),

    /// 外部依赖（缓存等）访问失败
    #[error("External service error: {0}")]
    ExternalService(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
