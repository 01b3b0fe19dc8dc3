//! shopcache - 商铺读穿缓存核心
//!
//! 提供带互斥重建与空值缓存的读穿缓存，
//! 防御缓存穿透（不存在键的反复回源）与
//! 缓存击穿（热键过期引发的并发重建风暴）。

#![doc(html_root_url = "https://docs.rs/shopcache/0.1.0")]

pub use serde;
pub use serde::{Deserialize, Serialize};
pub use serde_json;
pub use tokio;

pub mod backend;
pub mod config;
pub mod error;
pub mod lock;
pub mod metrics;
pub mod reader;
pub mod rebuild;
pub mod serialization;
pub mod service;
pub mod store;

// Re-export commonly used items
pub use backend::{CacheBackend, MemoryBackend, RedisBackend};
pub use config::Config;
pub use error::{CacheError, Result};
pub use lock::{LockToken, ShopLock};
pub use reader::{CacheReader, Lookup};
pub use rebuild::RebuildCoordinator;
pub use service::{ShopResult, ShopService};
pub use store::{Shop, ShopStore};

/// shopcache 版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
