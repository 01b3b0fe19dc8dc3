//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了基于缓存条件写的分布式互斥锁。

use crate::backend::CacheBackend;
use crate::config::LockConfig;
use crate::error::Result;
use crate::metrics::GLOBAL_METRICS;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// 锁持有凭证
///
/// 释放时凭值比较，避免误删已被后来者取得的锁
#[derive(Debug)]
pub struct LockToken {
    key: String,
    value: String,
}

impl LockToken {
    /// 锁键
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// 商铺重建互斥锁
///
/// 并非语言级锁，而是缓存存储上的约定：
/// 键存在即表示该id的重建正在进行。
/// 锁自带过期时间，持有者崩溃后自动恢复
pub struct ShopLock {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
    key_prefix: String,
}

impl ShopLock {
    /// 创建新的互斥锁实例
    pub fn new(backend: Arc<dyn CacheBackend>, config: &LockConfig) -> Self {
        Self {
            backend,
            ttl: config.ttl(),
            key_prefix: config.key_prefix.clone(),
        }
    }

    /// 指定id的锁键
    pub fn key_for(&self, id: i64) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    /// 尝试获取锁，不阻塞
    ///
    /// 成功返回持有凭证，竞争失败返回None
    #[instrument(skip(self), level = "debug")]
    pub async fn try_acquire(&self, id: i64) -> Result<Option<LockToken>> {
        let key = self.key_for(id);
        let value = Uuid::new_v4().simple().to_string();
        let acquired = self
            .backend
            .set_nx(&key, value.clone().into_bytes(), self.ttl)
            .await?;
        if acquired {
            debug!("Lock acquired: key={}", key);
            GLOBAL_METRICS.record_request("lock", "acquire", "acquired");
            Ok(Some(LockToken { key, value }))
        } else {
            debug!("Lock contended: key={}", key);
            GLOBAL_METRICS.record_request("lock", "acquire", "contended");
            Ok(None)
        }
    }

    /// 释放锁
    ///
    /// 仅当锁值仍为本次获取写入的凭证时才删除；
    /// 凭证不匹配说明锁已过期并被其他调用者接管
    #[instrument(skip(self, token), level = "debug", fields(key = %token.key))]
    pub async fn release(&self, token: LockToken) -> Result<bool> {
        let released = self
            .backend
            .delete_if_equals(&token.key, token.value.as_bytes())
            .await?;
        if !released {
            warn!(
                "Lock was not released: key={}, it expired and may have been taken over",
                token.key
            );
        }
        GLOBAL_METRICS.record_request(
            "lock",
            "release",
            if released { "released" } else { "lost" },
        );
        Ok(released)
    }
}
