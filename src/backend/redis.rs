//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了基于Redis的分布式缓存后端实现。

use super::CacheBackend;
use crate::config::RedisConfig;
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument};

/// Redis缓存后端实现
///
/// 单机模式，通过ConnectionManager自动重连；
/// 所有命令带统一的执行超时
#[derive(Clone)]
pub struct RedisBackend {
    manager: ConnectionManager,
    command_timeout: Duration,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

impl RedisBackend {
    /// 创建新的Redis后端实例
    #[instrument(skip(config), level = "info", name = "init_redis_backend")]
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.connection_string.expose_secret())?;
        let manager = match timeout(
            Duration::from_millis(config.connection_timeout_ms),
            client.get_connection_manager(),
        )
        .await
        {
            Ok(res) => res?,
            Err(_) => {
                return Err(CacheError::BackendError(format!(
                    "Redis connection timed out after {}ms",
                    config.connection_timeout_ms
                )));
            }
        };
        Ok(Self {
            manager,
            command_timeout: Duration::from_millis(config.command_timeout_ms),
        })
    }

    fn timeout_error(&self) -> CacheError {
        CacheError::BackendError(format!(
            "Redis command timed out after {}ms",
            self.command_timeout.as_millis()
        ))
    }

    /// 检查连接可用性
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        let fut = async move {
            let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, CacheError>(pong)
        };
        match timeout(self.command_timeout, fut).await {
            Ok(res) => {
                res?;
                Ok(())
            }
            Err(_) => Err(self.timeout_error()),
        }
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.manager.clone();
        let fut = async move {
            let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
            Ok::<_, CacheError>(value)
        };
        match timeout(self.command_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(self.timeout_error()),
        }
    }

    #[instrument(skip(self, value), level = "debug", fields(value_len = value.len()))]
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        debug!("Setting key: {} with ttl: {:?}", key, ttl);
        let mut conn = self.manager.clone();
        let ttl_ms = ttl.as_millis() as u64;
        let fut = async move {
            let _: () = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(ttl_ms)
                .query_async(&mut conn)
                .await?;
            Ok::<_, CacheError>(())
        };
        match timeout(self.command_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(self.timeout_error()),
        }
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set_nx(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<bool> {
        let mut conn = self.manager.clone();
        let ttl_ms = ttl.as_millis() as u64;
        let fut = async move {
            let result: Option<String> = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("NX")
                .arg("PX")
                .arg(ttl_ms)
                .query_async(&mut conn)
                .await?;
            Ok::<_, CacheError>(result.is_some())
        };
        let acquired = match timeout(self.command_timeout, fut).await {
            Ok(res) => res?,
            Err(_) => return Err(self.timeout_error()),
        };
        debug!("SET NX result: key={}, acquired={}", key, acquired);
        Ok(acquired)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let fut = async move {
            let _: () = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
            Ok::<_, CacheError>(())
        };
        match timeout(self.command_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(self.timeout_error()),
        }
    }

    #[instrument(skip(self, expected), level = "debug")]
    async fn delete_if_equals(&self, key: &str, expected: &[u8]) -> Result<bool> {
        let script = redis::Script::new(
            r#"
            if redis.call("get", KEYS[1]) == ARGV[1] then
                return redis.call("del", KEYS[1])
            else
                return 0
            end
            "#,
        );
        let mut conn = self.manager.clone();
        let fut = async move {
            let deleted: i32 = script.key(key).arg(expected).invoke_async(&mut conn).await?;
            Ok::<_, CacheError>(deleted == 1)
        };
        match timeout(self.command_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(self.timeout_error()),
        }
    }
}
