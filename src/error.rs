//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了缓存系统的错误类型和处理机制。

use thiserror::Error;

/// 缓存系统错误类型枚举
///
/// 定义了读穿缓存核心中可能发生的各种错误类型
#[derive(Error, Debug)]
pub enum CacheError {
    /// 写路径入参非法（例如缺少记录id），在任何副作用发生之前被拒绝
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 持久层查询或更新失败，仅向持有锁的调用方传播
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// 锁竞争等待超出重试上限
    #[error("Lock wait exhausted for key {key} after {attempts} attempts")]
    LockTimeout { key: String, attempts: u32 },

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 缓存后端操作失败
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Redis错误
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    /// Sea-ORM数据库错误
    #[error("Sea-ORM error: {0}")]
    SeaOrmError(#[from] sea_orm::DbErr),

    /// IO错误
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// 缓存操作结果类型别名
///
/// 简化错误处理，所有缓存操作都返回此类型
pub type Result<T> = std::result::Result<T, CacheError>;
