//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了面向接入层的商铺缓存服务。

use crate::backend::CacheBackend;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::reader::CacheReader;
use crate::rebuild::RebuildCoordinator;
use crate::serialization::{JsonSerializer, SerializerEnum};
use crate::store::{Shop, ShopStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 面向接入层的结构化返回
///
/// 查询失败以结构化结果表达，不向接入层抛出异常
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopResult {
    /// 是否成功
    pub success: bool,
    /// 查询结果；成功但记录不存在时为None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Shop>,
    /// 失败原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl ShopResult {
    /// 成功结果
    pub fn ok(data: Option<Shop>) -> Self {
        Self {
            success: true,
            data,
            error_msg: None,
        }
    }

    /// 失败结果
    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error_msg: Some(msg.into()),
        }
    }
}

/// 商铺缓存服务
///
/// 缓存客户端与持久层均以能力形式注入，不依赖进程级全局句柄
pub struct ShopService {
    backend: Arc<dyn CacheBackend>,
    store: Arc<dyn ShopStore>,
    reader: CacheReader,
    coordinator: RebuildCoordinator,
}

impl ShopService {
    /// 创建新的商铺缓存服务
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        store: Arc<dyn ShopStore>,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;
        let serializer = SerializerEnum::Json(JsonSerializer::new());
        let reader = CacheReader::new(backend.clone(), serializer.clone(), &config.cache);
        let coordinator = RebuildCoordinator::new(
            backend.clone(),
            store.clone(),
            reader.clone(),
            serializer,
            config,
        );
        Ok(Self {
            backend,
            store,
            reader,
            coordinator,
        })
    }

    /// 按id查询商铺
    ///
    /// 互斥重建路径：防缓存击穿与穿透
    #[instrument(skip(self), level = "debug")]
    pub async fn query_by_id(&self, id: i64) -> ShopResult {
        match self.coordinator.query_with_mutex(id).await {
            Ok(shop) => ShopResult::ok(shop),
            Err(e) => {
                warn!("query_by_id failed: id={}, error={}", id, e);
                ShopResult::fail(e.to_string())
            }
        }
    }

    /// 按id查询商铺（仅穿透防护，无互斥）
    #[instrument(skip(self), level = "debug")]
    pub async fn query_with_pass_through(&self, id: i64) -> ShopResult {
        match self.coordinator.query_with_pass_through(id).await {
            Ok(shop) => ShopResult::ok(shop),
            Err(e) => {
                warn!("query_with_pass_through failed: id={}, error={}", id, e);
                ShopResult::fail(e.to_string())
            }
        }
    }

    /// 更新商铺
    ///
    /// 先提交持久层更新，再删除缓存条目。
    /// 顺序不可颠倒：先删缓存会留下一个窗口，
    /// 并发读者可能在存储提交之前用旧数据重建缓存
    #[instrument(skip(self, shop), level = "debug", fields(id = ?shop.id))]
    pub async fn update(&self, shop: &Shop) -> ShopResult {
        match self.try_update(shop).await {
            Ok(()) => ShopResult::ok(None),
            Err(e) => {
                warn!("update failed: id={:?}, error={}", shop.id, e);
                ShopResult::fail(e.to_string())
            }
        }
    }

    async fn try_update(&self, shop: &Shop) -> Result<()> {
        let id = shop
            .id
            .ok_or_else(|| CacheError::InvalidInput("shop id is required".to_string()))?;
        self.store.update_by_id(shop).await?;
        self.invalidate(id).await?;
        info!("Shop updated and cache invalidated: id={}", id);
        Ok(())
    }

    /// 删除指定id的缓存条目
    ///
    /// 无论当前是正向条目还是空值标记，一律删除
    pub async fn invalidate(&self, id: i64) -> Result<()> {
        self.backend.delete(&self.reader.key_for(id)).await
    }
}
