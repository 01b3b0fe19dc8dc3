//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 穿透防护集成测试：空值标记的写入、命中与过期。

#[path = "../common/mod.rs"]
mod common;

use common::{build_service, sample_shop, test_config, MemoryShopStore};
use std::sync::Arc;
use std::time::Duration;

// 不存在的id在空值TTL窗口内至多回源一次
#[tokio::test]
async fn repeated_lookups_for_missing_id_hit_store_once_per_ttl_window() {
    let store = Arc::new(MemoryShopStore::new());
    let (backend, service) = build_service(store.clone(), &test_config());

    let first = service.query_by_id(999).await;
    assert!(first.success);
    assert!(first.data.is_none());
    assert_eq!(store.find_calls(), 1);

    // 空值标记已写入：键存在、载荷为空
    assert_eq!(
        backend.get("cache:shop:999").await.unwrap(),
        Some(Vec::new())
    );

    // 窗口内反复查询不再回源
    for _ in 0..20 {
        let result = service.query_by_id(999).await;
        assert!(result.success);
        assert!(result.data.is_none());
    }
    assert_eq!(store.find_calls(), 1);

    // 空值TTL过期后允许再次回源（记录此后可能已被创建）
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let after_expiry = service.query_by_id(999).await;
    assert!(after_expiry.success);
    assert!(after_expiry.data.is_none());
    assert_eq!(store.find_calls(), 2);
}

// 空值标记过期后新建的记录可以被查到
#[tokio::test]
async fn negative_marker_staleness_is_bounded_by_null_ttl() {
    let store = Arc::new(MemoryShopStore::new());
    let (_backend, service) = build_service(store.clone(), &test_config());

    assert!(service.query_by_id(42).await.data.is_none());

    // 记录在空值标记存续期间被创建
    store.insert(sample_shop(42, "新开的店"));
    // 标记未过期时仍然回答"不存在"，这是被接受的有界不一致
    assert!(service.query_by_id(42).await.data.is_none());

    tokio::time::sleep(Duration::from_millis(1200)).await;
    let result = service.query_by_id(42).await;
    assert!(result.success);
    assert_eq!(result.data.unwrap().name, "新开的店");
}

// 空值命中等同"确认不存在"，不是需要重建的未命中
#[tokio::test]
async fn negative_hit_does_not_trigger_rebuild_or_lock() {
    let store = Arc::new(MemoryShopStore::new());
    let (backend, service) = build_service(store.clone(), &test_config());

    service.query_by_id(999).await;
    assert_eq!(store.find_calls(), 1);

    service.query_by_id(999).await;
    // 空值命中路径不应产生锁键
    assert_eq!(backend.get("lock:shop:999").await.unwrap(), None);
    assert_eq!(store.find_calls(), 1);
}
