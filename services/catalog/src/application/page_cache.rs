//! 列表页缓存
//!
//! 每页一个 Redis hash：field 为 game_id，value 为游戏 JSON。
//! 写入后只在键还没有过期时间时设置 TTL，表写入不触发失效。

use shiroha_common::Pagination;
use shiroha_ports::HashCachePort;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::Game;
use crate::infrastructure::observability::{
    CacheLookup, record_page_cache_lookup, record_page_cache_write_failure,
};

/// 缓存表名
pub const GAMES_TABLE: &str = "games";

/// 默认 TTL
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(3600);

pub struct PageCache {
    cache: Arc<dyn HashCachePort>,
    table: String,
    ttl: Duration,
}

impl PageCache {
    pub fn new(cache: Arc<dyn HashCachePort>, ttl: Duration) -> Self {
        Self {
            cache,
            table: GAMES_TABLE.to_string(),
            ttl,
        }
    }

    /// `{table}:page:{page}:size:{page_size}`
    pub fn key(&self, pagination: &Pagination) -> String {
        format!(
            "{}:page:{}:size:{}",
            self.table, pagination.page, pagination.page_size
        )
    }

    /// 读取缓存页，返回 None 表示未命中
    pub async fn get(&self, pagination: &Pagination) -> Option<Vec<Game>> {
        let key = self.key(pagination);

        let entries = match self.cache.hash_get_all(&key).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(key = %key, error = %e, "Page cache read failed");
                record_page_cache_lookup(CacheLookup::Error);
                return None;
            }
        };

        let mut games: Vec<Game> = entries
            .into_iter()
            .filter_map(|(field, value)| match serde_json::from_str::<Game>(&value) {
                Ok(game) => Some(game),
                Err(e) => {
                    warn!(key = %key, field = %field, error = %e, "Skipping undecodable cache entry");
                    None
                }
            })
            .collect();

        if games.is_empty() {
            debug!(key = %key, "Page cache miss");
            record_page_cache_lookup(CacheLookup::Miss);
            return None;
        }

        // hash 字段无序，按数据库的排序规则还原
        games.sort_by(|a, b| a.game_id.cmp(&b.game_id));

        debug!(key = %key, count = games.len(), "Page cache hit");
        record_page_cache_lookup(CacheLookup::Hit);
        Some(games)
    }

    /// 写入缓存页，失败只记录日志
    pub async fn put(&self, pagination: &Pagination, games: &[Game]) {
        if games.is_empty() {
            return;
        }

        let key = self.key(pagination);
        let mut fields = Vec::with_capacity(games.len());
        for game in games {
            match serde_json::to_string(game) {
                Ok(value) => fields.push((game.game_id.to_string(), value)),
                Err(e) => warn!(game_id = %game.game_id, error = %e, "Failed to encode game for cache"),
            }
        }

        if let Err(e) = self.cache.hash_set_all(&key, &fields).await {
            warn!(key = %key, error = %e, "Page cache write failed");
            record_page_cache_write_failure();
            return;
        }

        match self.cache.expire_if_unset(&key, self.ttl).await {
            Ok(updated) => debug!(key = %key, ttl_secs = self.ttl.as_secs(), updated, "Page cached"),
            Err(e) => {
                warn!(key = %key, error = %e, "Page cache expire failed");
                record_page_cache_write_failure();
            }
        }
    }
}
