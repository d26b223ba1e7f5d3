//! Cache trait 定义

use async_trait::async_trait;
use shiroha_errors::AppResult;
use std::collections::HashMap;
use std::time::Duration;

/// 缓存 trait
#[async_trait]
pub trait CachePort: Send + Sync {
    /// 获取缓存值
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置缓存值
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 删除缓存
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 检查键是否存在
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// 设置过期时间
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<()>;

    /// 原子性地读取并删除
    async fn take(&self, key: &str) -> AppResult<Option<String>>;
}

/// 哈希表缓存 trait
///
/// 一个键对应一张哈希表，每个字段存放一条记录
#[async_trait]
pub trait HashCachePort: Send + Sync {
    /// 获取哈希表中的所有字段和值，键不存在时返回空表
    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>>;

    /// 一次写入多个字段
    async fn hash_set_all(&self, key: &str, fields: &[(String, String)]) -> AppResult<()>;

    /// 仅当键尚未设置过期时间时设置，返回是否设置成功
    async fn expire_if_unset(&self, key: &str, ttl: Duration) -> AppResult<bool>;
}
