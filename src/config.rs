//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了缓存系统的配置结构和解析逻辑。

use crate::error::{CacheError, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 商铺缓存键前缀
pub const CACHE_SHOP_KEY: &str = "cache:shop:";
/// 商铺重建锁键前缀
pub const LOCK_SHOP_KEY: &str = "lock:shop:";

/// 顶层配置
///
/// `redis` 与 `database` 为可选段：仅使用内存后端或自带存储实现时可省略
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// 缓存条目配置
    pub cache: CacheConfig,
    /// 重建互斥锁配置
    pub lock: LockConfig,
    /// Redis后端配置
    pub redis: Option<RedisConfig>,
    /// 持久层数据库配置
    pub database: Option<DatabaseConfig>,
}

/// 缓存条目配置
///
/// 正向条目与空值标记各自的过期时间，以及键命名前缀
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// 正向条目过期时间（秒）
    pub shop_ttl_secs: u64,
    /// 空值标记过期时间（秒），必须小于正向过期时间
    pub null_ttl_secs: u64,
    /// 缓存键前缀
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            shop_ttl_secs: 30 * 60,
            null_ttl_secs: 2 * 60,
            key_prefix: CACHE_SHOP_KEY.to_string(),
        }
    }
}

impl CacheConfig {
    /// 正向条目过期时间
    pub fn shop_ttl(&self) -> Duration {
        Duration::from_secs(self.shop_ttl_secs)
    }

    /// 空值标记过期时间
    pub fn null_ttl(&self) -> Duration {
        Duration::from_secs(self.null_ttl_secs)
    }
}

/// 重建互斥锁配置
///
/// 锁自身的过期时间保证持有者崩溃后自动恢复，
/// 竞争方按固定间隔重试，超出上限后返回超时错误
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LockConfig {
    /// 锁过期时间（秒）
    pub ttl_secs: u64,
    /// 竞争失败后的重试间隔（毫秒）
    pub retry_interval_ms: u64,
    /// 最大重试次数，超出后返回 `LockTimeout`
    pub max_retries: u32,
    /// 锁键前缀
    pub key_prefix: String,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 10,
            retry_interval_ms: 50,
            // 两个锁周期内可完成约400次重试
            max_retries: 400,
            key_prefix: LOCK_SHOP_KEY.to_string(),
        }
    }
}

impl LockConfig {
    /// 锁过期时间
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// 重试间隔
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

/// Redis后端配置
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RedisConfig {
    /// 连接字符串
    pub connection_string: SecretString,
    /// 连接超时时间（毫秒）
    pub connection_timeout_ms: u64,
    /// 命令执行超时时间（毫秒）
    pub command_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            connection_string: String::from("redis://127.0.0.1:6379").into(),
            connection_timeout_ms: 5000,
            command_timeout_ms: 2000,
        }
    }
}

/// 持久层数据库配置
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// 数据库连接字符串
    pub url: SecretString,
}

impl Config {
    /// 从TOML文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CacheError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    ///
    /// 空值标记的过期时间必须严格小于正向条目，
    /// 否则"不存在"的错误答案可能比真实数据存活更久
    pub fn validate(&self) -> Result<()> {
        if self.cache.shop_ttl_secs == 0 {
            return Err(CacheError::Configuration(
                "cache.shop_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.cache.null_ttl_secs == 0 {
            return Err(CacheError::Configuration(
                "cache.null_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.cache.null_ttl_secs >= self.cache.shop_ttl_secs {
            return Err(CacheError::Configuration(format!(
                "cache.null_ttl_secs ({}) must be less than cache.shop_ttl_secs ({})",
                self.cache.null_ttl_secs, self.cache.shop_ttl_secs
            )));
        }
        if self.lock.ttl_secs == 0 {
            return Err(CacheError::Configuration(
                "lock.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.lock.retry_interval_ms == 0 {
            return Err(CacheError::Configuration(
                "lock.retry_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.lock.max_retries == 0 {
            return Err(CacheError::Configuration(
                "lock.max_retries must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
