//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了缓存快路径读取器。

use crate::backend::CacheBackend;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::metrics::GLOBAL_METRICS;
use crate::serialization::{Serializer, SerializerEnum};
use crate::store::Shop;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 缓存读取结果
///
/// 一个键在任意时刻恰好处于三种状态之一
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// 命中，缓存持有有效记录
    Hit(Shop),
    /// 键不存在，需要触发重建
    Miss,
    /// 命中空值标记，记录确认不存在
    ///
    /// 调用方必须将其视同"确认不存在"，而非触发重建的未命中
    NegativeHit,
}

/// 缓存快路径读取器
///
/// 纯读操作：区分正向条目、空值标记与键不存在三种状态。
/// 空值标记即"键存在、载荷为空"，无需额外哨兵格式
#[derive(Clone)]
pub struct CacheReader {
    backend: Arc<dyn CacheBackend>,
    serializer: SerializerEnum,
    key_prefix: String,
}

impl CacheReader {
    /// 创建新的缓存读取器
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        serializer: SerializerEnum,
        config: &CacheConfig,
    ) -> Self {
        Self {
            backend,
            serializer,
            key_prefix: config.key_prefix.clone(),
        }
    }

    /// 指定id的缓存键
    pub fn key_for(&self, id: i64) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    /// 快路径查询
    #[instrument(skip(self), level = "debug")]
    pub async fn lookup(&self, id: i64) -> Result<Lookup> {
        let key = self.key_for(id);
        match self.backend.get(&key).await? {
            Some(payload) if payload.is_empty() => {
                debug!("Negative hit: key={}", key);
                GLOBAL_METRICS.record_request("cache", "get", "negative_hit");
                Ok(Lookup::NegativeHit)
            }
            Some(payload) => {
                let shop: Shop = self.serializer.deserialize(&payload)?;
                debug!("Cache hit: key={}", key);
                GLOBAL_METRICS.record_request("cache", "get", "hit");
                Ok(Lookup::Hit(shop))
            }
            None => {
                debug!("Cache miss: key={}", key);
                GLOBAL_METRICS.record_request("cache", "get", "miss");
                Ok(Lookup::Miss)
            }
        }
    }
}
