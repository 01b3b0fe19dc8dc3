//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了进程内缓存后端的实现，基于Moka的内存缓存。

use super::CacheBackend;
use crate::error::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// 进程内缓存后端实现
///
/// 基于Moka的内存缓存，过期时间随值存储并在读取时惰性清理。
/// 适用于单节点部署，同时作为并发测试的共享后端替身
pub struct MemoryBackend {
    // 值: (数据, 过期时间)
    cache: Cache<String, (Vec<u8>, Option<Instant>)>,
    // Moka不提供比较交换，条件操作经由互斥量串行化
    cond_lock: Mutex<()>,
}

impl MemoryBackend {
    /// 创建新的内存后端实例
    ///
    /// # 参数
    ///
    /// * `capacity` - 缓存最大容量（条目数）
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
            cond_lock: Mutex::new(()),
        }
    }

    /// 读取未过期的值，过期条目顺带清除
    async fn get_live(&self, key: &str) -> Option<Vec<u8>> {
        match self.cache.get(key).await {
            Some((bytes, expire_at)) => {
                if let Some(expire_time) = expire_at {
                    if Instant::now() >= expire_time {
                        self.cache.remove(key).await;
                        debug!("Memory get: key={}, expired=true, removed", key);
                        return None;
                    }
                }
                Some(bytes)
            }
            None => None,
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get_live(key).await)
    }

    #[instrument(skip(self, value), level = "debug", fields(value_len = value.len()))]
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let expire_at = Some(Instant::now() + ttl);
        self.cache.insert(key.to_string(), (value, expire_at)).await;
        Ok(())
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set_nx(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<bool> {
        let _guard = self.cond_lock.lock().await;
        if self.get_live(key).await.is_some() {
            return Ok(false);
        }
        let expire_at = Some(Instant::now() + ttl);
        self.cache.insert(key.to_string(), (value, expire_at)).await;
        Ok(true)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    #[instrument(skip(self, expected), level = "debug")]
    async fn delete_if_equals(&self, key: &str, expected: &[u8]) -> Result<bool> {
        let _guard = self.cond_lock.lock().await;
        match self.get_live(key).await {
            Some(current) if current == expected => {
                self.cache.remove(key).await;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
