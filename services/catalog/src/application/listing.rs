//! 分页列表（cache-aside）

use serde::{Deserialize, Serialize};
use shiroha_common::{PageInfo, Pagination};
use shiroha_errors::AppResult;
use std::sync::Arc;

use super::game_service::GameService;
use super::page_cache::PageCache;
use crate::domain::Game;

/// 列表响应体，不使用统一信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePage {
    pub pagination: PageInfo,
    pub games: Vec<Game>,
}

pub struct GameListing {
    games: Arc<GameService>,
    cache: PageCache,
}

impl GameListing {
    pub fn new(games: Arc<GameService>, cache: PageCache) -> Self {
        Self { games, cache }
    }

    /// 总数每次从数据库读取，页内容优先读缓存
    pub async fn list(&self, pagination: &Pagination) -> AppResult<GamePage> {
        let total_count = self.games.count().await?;
        let info = PageInfo::new(pagination, total_count);

        if let Some(games) = self.cache.get(pagination).await {
            return Ok(GamePage {
                pagination: info,
                games,
            });
        }

        let games = self.games.list_page(pagination).await?;
        self.cache.put(pagination, &games).await;

        Ok(GamePage {
            pagination: info,
            games,
        })
    }
}
