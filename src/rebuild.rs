//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了互斥重建协调器：
//! 将一次缓存未命中解析为正向条目或空值标记，
//! 并保证同一键在全体并发调用者之间至多一个在途重建。

use crate::backend::CacheBackend;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::lock::ShopLock;
use crate::metrics::GLOBAL_METRICS;
use crate::reader::{CacheReader, Lookup};
use crate::serialization::{Serializer, SerializerEnum};
use crate::store::{Shop, ShopStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// 互斥重建协调器
///
/// 击穿防护：热键过期时通过分布式互斥锁将重建串行化，
/// 竞争方退避后重查缓存而不是各自回源。
/// 穿透防护：确认不存在的记录写入短过期的空值标记
pub struct RebuildCoordinator {
    backend: Arc<dyn CacheBackend>,
    store: Arc<dyn ShopStore>,
    reader: CacheReader,
    lock: ShopLock,
    serializer: SerializerEnum,
    shop_ttl: Duration,
    null_ttl: Duration,
    retry_interval: Duration,
    max_retries: u32,
}

impl RebuildCoordinator {
    /// 创建新的重建协调器
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        store: Arc<dyn ShopStore>,
        reader: CacheReader,
        serializer: SerializerEnum,
        config: &Config,
    ) -> Self {
        let lock = ShopLock::new(backend.clone(), &config.lock);
        Self {
            backend,
            store,
            reader,
            lock,
            serializer,
            shop_ttl: config.cache.shop_ttl(),
            null_ttl: config.cache.null_ttl(),
            retry_interval: config.lock.retry_interval(),
            max_retries: config.lock.max_retries,
        }
    }

    /// 互斥重建查询
    ///
    /// 快路径命中（含空值标记）直接返回；未命中时尝试获取重建锁：
    /// 成功则回源重建，失败则退避后重新执行完整查询。
    /// 重试以显式上限约束，超出后返回 `LockTimeout` 而非无界递归
    #[instrument(skip(self), level = "debug")]
    pub async fn query_with_mutex(&self, id: i64) -> Result<Option<Shop>> {
        for attempt in 0..=self.max_retries {
            match self.reader.lookup(id).await? {
                Lookup::Hit(shop) => return Ok(Some(shop)),
                Lookup::NegativeHit => return Ok(None),
                Lookup::Miss => {}
            }

            let token = match self.lock.try_acquire(id).await? {
                Some(token) => token,
                None => {
                    // 锁被其他调用者持有：退避后重查，持有者可能已完成重建
                    debug!("Rebuild contended: id={}, attempt={}", id, attempt);
                    sleep(self.retry_interval).await;
                    continue;
                }
            };

            let result = self.rebuild(id).await;
            // 所有出口路径都释放锁；凭证比较防止误删后来者的锁
            if let Err(e) = self.lock.release(token).await {
                warn!("Failed to release rebuild lock for id={}: {}", id, e);
            }
            return result;
        }

        GLOBAL_METRICS.record_request("lock", "acquire", "exhausted");
        Err(CacheError::LockTimeout {
            key: self.lock.key_for(id),
            attempts: self.max_retries,
        })
    }

    /// 穿透防护查询（无互斥）
    ///
    /// 仅做空值缓存，不对重建加锁；
    /// 热键场景应使用 `query_with_mutex`
    #[instrument(skip(self), level = "debug")]
    pub async fn query_with_pass_through(&self, id: i64) -> Result<Option<Shop>> {
        match self.reader.lookup(id).await? {
            Lookup::Hit(shop) => Ok(Some(shop)),
            Lookup::NegativeHit => Ok(None),
            Lookup::Miss => self.rebuild(id).await,
        }
    }

    /// 持锁重建
    ///
    /// 进入前先整体复查一次缓存：从首次观察到未命中到取得锁之间，
    /// 前一个持有者可能已经写入了正向条目或空值标记。
    /// 回源失败时不写入任何条目，错误仅传播给持锁的调用者
    async fn rebuild(&self, id: i64) -> Result<Option<Shop>> {
        match self.reader.lookup(id).await? {
            Lookup::Hit(shop) => return Ok(Some(shop)),
            Lookup::NegativeHit => return Ok(None),
            Lookup::Miss => {}
        }

        let key = self.reader.key_for(id);
        match self.store.find_by_id(id).await? {
            Some(shop) => {
                let payload = self.serializer.serialize(&shop)?;
                self.backend.set(&key, payload, self.shop_ttl).await?;
                debug!("Rebuilt positive entry: key={}", key);
                GLOBAL_METRICS.record_request("store", "rebuild", "found");
                Ok(Some(shop))
            }
            None => {
                // 空值标记：空载荷加较短过期时间，兜住对不存在id的反复查询
                self.backend.set(&key, Vec::new(), self.null_ttl).await?;
                debug!("Rebuilt negative marker: key={}", key);
                GLOBAL_METRICS.record_request("store", "rebuild", "not_found");
                Ok(None)
            }
        }
    }
}
