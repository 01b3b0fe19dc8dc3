//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了缓存系统的指标收集功能。

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 指标收集器
///
/// 收集读路径、重建与锁操作的计数指标
#[derive(Clone, Debug, Default)]
pub struct Metrics {
    /// 请求总数统计
    /// key: "layer:op:result"
    pub requests_total: Arc<Mutex<HashMap<String, u64>>>,
}

lazy_static! {
    /// 全局指标实例
    pub static ref GLOBAL_METRICS: Metrics = Metrics::default();
}

impl Metrics {
    /// 记录请求指标
    ///
    /// # 参数
    ///
    /// * `layer` - 组件（cache/lock/store）
    /// * `op` - 操作类型（get/acquire/rebuild等）
    /// * `result` - 操作结果（hit/miss/negative_hit等）
    pub fn record_request(&self, layer: &str, op: &str, result: &str) {
        let key = format!("{}:{}:{}", layer, op, result);
        let mut map = self.requests_total.lock().unwrap();
        *map.entry(key).or_insert(0) += 1;
    }

    /// 读取指定指标的当前计数
    pub fn get(&self, layer: &str, op: &str, result: &str) -> u64 {
        let key = format!("{}:{}:{}", layer, op, result);
        let map = self.requests_total.lock().unwrap();
        map.get(&key).copied().unwrap_or(0)
    }
}

/// 获取指标字符串
///
/// 将所有指标格式化为字符串返回，用于监控系统采集
pub fn get_metrics_string() -> String {
    let metrics = &GLOBAL_METRICS;
    let reqs = metrics.requests_total.lock().unwrap();

    let mut output = String::new();
    let mut keys: Vec<_> = reqs.keys().collect();
    keys.sort();
    for k in keys {
        output.push_str(&format!(
            "cache_requests_total{{labels=\"{}\"}} {}\n",
            k, reqs[k]
        ));
    }
    output
}
