//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 击穿防护集成测试：并发重建去重与锁自愈。

#[path = "../common/mod.rs"]
mod common;

use common::{build_service, sample_shop, test_config, MemoryShopStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

// N个并发调用者竞争同一冷键，至多一次回源，结果一致
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cold_lookups_trigger_at_most_one_store_fetch() {
    // 放大回源耗时，让所有竞争者都撞上在途重建
    let store = Arc::new(MemoryShopStore::with_find_delay(Duration::from_millis(80)));
    store.insert(sample_shop(7, "茶颜悦色"));
    let (_backend, service) = build_service(store.clone(), &test_config());
    let service = Arc::new(service);

    let concurrency = 32;
    let barrier = Arc::new(Barrier::new(concurrency));
    let mut handles = Vec::new();
    for _ in 0..concurrency {
        let svc = service.clone();
        let b = barrier.clone();
        handles.push(tokio::spawn(async move {
            b.wait().await;
            svc.query_by_id(7).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.success);
        assert_eq!(result.data.unwrap().name, "茶颜悦色");
    }
    assert_eq!(store.find_calls(), 1, "重建必须在并发调用者间去重");
}

// 不存在的id在并发下同样只回源一次
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_lookups_for_missing_id_also_deduplicate() {
    let store = Arc::new(MemoryShopStore::with_find_delay(Duration::from_millis(80)));
    let (_backend, service) = build_service(store.clone(), &test_config());
    let service = Arc::new(service);

    let concurrency = 16;
    let barrier = Arc::new(Barrier::new(concurrency));
    let mut handles = Vec::new();
    for _ in 0..concurrency {
        let svc = service.clone();
        let b = barrier.clone();
        handles.push(tokio::spawn(async move {
            b.wait().await;
            svc.query_by_id(999).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.success);
        assert!(result.data.is_none());
    }
    assert_eq!(store.find_calls(), 1);
}

// 持有者崩溃（永不释放），锁TTL过期后重建自动恢复
#[tokio::test]
async fn crashed_lock_owner_recovers_after_ttl() {
    let store = Arc::new(MemoryShopStore::new());
    store.insert(sample_shop(7, "茶颜悦色"));
    let config = test_config();
    let (backend, service) = build_service(store.clone(), &config);

    // 崩溃的持有者：锁键存在但没有任何人会释放它
    assert!(backend
        .set_nx(
            "lock:shop:7",
            b"crashed-owner".to_vec(),
            Duration::from_secs(1),
        )
        .await
        .unwrap());

    let start = std::time::Instant::now();
    let result = service.query_by_id(7).await;
    assert!(result.success, "锁过期后查询应自动恢复: {:?}", result.error_msg);
    assert_eq!(result.data.unwrap().name, "茶颜悦色");
    assert!(
        start.elapsed() >= Duration::from_millis(900),
        "恢复不应早于锁TTL"
    );
    assert_eq!(store.find_calls(), 1);
}

// 不同id的重建互不阻塞
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rebuilds_for_distinct_ids_are_independent() {
    let store = Arc::new(MemoryShopStore::with_find_delay(Duration::from_millis(50)));
    for id in 1..=4 {
        store.insert(sample_shop(id, &format!("shop-{}", id)));
    }
    let (_backend, service) = build_service(store.clone(), &test_config());
    let service = Arc::new(service);

    let start = std::time::Instant::now();
    let mut handles = Vec::new();
    for id in 1..=4 {
        let svc = service.clone();
        handles.push(tokio::spawn(async move { svc.query_by_id(id).await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().success);
    }

    // 串行执行需要约200ms；并行下应显著更快
    assert!(start.elapsed() < Duration::from_millis(180));
    assert_eq!(store.find_calls(), 4);
}
