//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了测试的通用工具函数和替身实现。

use async_trait::async_trait;
use shopcache::backend::{CacheBackend, MemoryBackend};
use shopcache::config::Config;
use shopcache::error::{CacheError, Result};
use shopcache::service::ShopService;
use shopcache::store::{Shop, ShopStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

#[allow(dead_code)]
pub fn setup_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_span_events(FmtSpan::CLOSE)
            .with_env_filter(EnvFilter::new("info"))
            .try_init()
            .ok();
    });
}

/// 内存商铺存储替身
///
/// 记录回源次数用于断言"至多一次重建"，
/// 可注入固定延迟放大并发窗口，可切换为故障模式
#[allow(dead_code)]
pub struct MemoryShopStore {
    shops: Mutex<HashMap<i64, Shop>>,
    find_calls: AtomicU64,
    update_calls: AtomicU64,
    fail_finds: AtomicBool,
    find_delay: Duration,
}

impl MemoryShopStore {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::with_find_delay(Duration::ZERO)
    }

    #[allow(dead_code)]
    pub fn with_find_delay(find_delay: Duration) -> Self {
        Self {
            shops: Mutex::new(HashMap::new()),
            find_calls: AtomicU64::new(0),
            update_calls: AtomicU64::new(0),
            fail_finds: AtomicBool::new(false),
            find_delay,
        }
    }

    #[allow(dead_code)]
    pub fn insert(&self, shop: Shop) {
        let id = shop.id.expect("fixture shop must have an id");
        self.shops.lock().unwrap().insert(id, shop);
    }

    #[allow(dead_code)]
    pub fn find_calls(&self) -> u64 {
        self.find_calls.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn update_calls(&self) -> u64 {
        self.update_calls.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn set_fail_finds(&self, fail: bool) {
        self.fail_finds.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ShopStore for MemoryShopStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Shop>> {
        if self.fail_finds.load(Ordering::SeqCst) {
            return Err(CacheError::StoreUnavailable(
                "injected store failure".to_string(),
            ));
        }
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if !self.find_delay.is_zero() {
            tokio::time::sleep(self.find_delay).await;
        }
        let shop = self.shops.lock().unwrap().get(&id).cloned();
        Ok(shop)
    }

    async fn update_by_id(&self, shop: &Shop) -> Result<()> {
        let id = shop
            .id
            .ok_or_else(|| CacheError::InvalidInput("shop id is required".to_string()))?;
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut shops = self.shops.lock().unwrap();
        if !shops.contains_key(&id) {
            return Err(CacheError::StoreUnavailable(format!(
                "shop {} does not exist",
                id
            )));
        }
        shops.insert(id, shop.clone());
        Ok(())
    }
}

/// 构造测试用商铺记录
#[allow(dead_code)]
pub fn sample_shop(id: i64, name: &str) -> Shop {
    Shop {
        id: Some(id),
        name: name.to_string(),
        type_id: 1,
        images: "a.jpg".to_string(),
        area: Some("大关".to_string()),
        address: "金华路88号".to_string(),
        x: 120.149192,
        y: 30.316078,
        avg_price: Some(80),
        sold: 100,
        comments: 35,
        score: 45,
        open_hours: Some("10:00-22:00".to_string()),
        create_time: None,
        update_time: None,
    }
}

/// 测试配置：缩短各TTL以便在测试内观察过期行为
#[allow(dead_code)]
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.cache.shop_ttl_secs = 60;
    config.cache.null_ttl_secs = 1;
    config.lock.ttl_secs = 1;
    config.lock.retry_interval_ms = 10;
    config.lock.max_retries = 300;
    config
}

/// 组装共享内存后端、存储替身与服务
#[allow(dead_code)]
pub fn build_service(
    store: Arc<MemoryShopStore>,
    config: &Config,
) -> (Arc<dyn CacheBackend>, ShopService) {
    setup_logging();
    let backend: Arc<dyn CacheBackend> = Arc::new(MemoryBackend::default());
    let service = ShopService::new(backend.clone(), store, config).expect("valid test config");
    (backend, service)
}
