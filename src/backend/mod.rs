//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了缓存后端能力接口及其实现。

pub mod memory;
pub mod redis;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub use memory::MemoryBackend;
pub use redis::RedisBackend;

/// 缓存后端能力接口
///
/// 读路径与重建锁都通过该接口访问共享缓存，
/// 以显式注入的方式替代进程级全局客户端，便于使用测试替身
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// 读取原始字节，键不存在时返回None
    ///
    /// 空值标记以"键存在、载荷为空"表示，由上层读取器区分
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// 写入并设置过期时间
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// 仅当键不存在时写入（SET NX语义），返回是否写入成功
    async fn set_nx(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<bool>;

    /// 删除键，键不存在时也视为成功
    async fn delete(&self, key: &str) -> Result<()>;

    /// 当且仅当当前值等于expected时原子删除，返回是否删除
    ///
    /// 锁释放依赖该操作防止误删后来者的锁
    async fn delete_if_equals(&self, key: &str, expected: &[u8]) -> Result<bool>;
}
