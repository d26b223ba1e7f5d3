//! Redis Cache 实现

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use shiroha_errors::{AppError, AppResult};
use shiroha_ports::{CachePort, HashCachePort};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Redis Cache
///
/// `ConnectionManager` 内部自带重连，每次调用克隆一份句柄即可
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// 底层连接，供健康检查使用
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl CachePort for RedisCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| AppError::internal(format!("Redis get failed: {}", e)))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(duration) => conn
                .set_ex(key, value, duration.as_secs())
                .await
                .map_err(|e| AppError::internal(format!("Redis set failed: {}", e))),
            None => conn
                .set(key, value)
                .await
                .map_err(|e| AppError::internal(format!("Redis set failed: {}", e))),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del(key)
            .await
            .map_err(|e| AppError::internal(format!("Redis delete failed: {}", e)))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        conn.exists(key)
            .await
            .map_err(|e| AppError::internal(format!("Redis exists failed: {}", e)))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.expire(key, ttl.as_secs() as i64)
            .await
            .map_err(|e| AppError::internal(format!("Redis expire failed: {}", e)))
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        redis::cmd("GETDEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::internal(format!("Redis getdel failed: {}", e)))
    }
}

#[async_trait]
impl HashCachePort for RedisCache {
    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>> {
        let mut conn = self.conn.clone();
        conn.hgetall(key)
            .await
            .map_err(|e| AppError::internal(format!("Redis hgetall failed: {}", e)))
    }

    async fn hash_set_all(&self, key: &str, fields: &[(String, String)]) -> AppResult<()> {
        if fields.is_empty() {
            // HSET 至少需要一个字段
            return Ok(());
        }

        let mut conn = self.conn.clone();
        conn.hset_multiple(key, fields)
            .await
            .map_err(|e| AppError::internal(format!("Redis hset failed: {}", e)))
    }

    async fn expire_if_unset(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let mut conn = self.conn.clone();

        // EXPIRE ... NX 只在键没有过期时间时生效，返回 1 表示已设置
        let updated: i64 = redis::cmd("EXPIRE")
            .arg(key)
            .arg(ttl.as_secs())
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::internal(format!("Redis expire failed: {}", e)))?;

        debug!(key, updated, "EXPIRE NX");
        Ok(updated == 1)
    }
}
