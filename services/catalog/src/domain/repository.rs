//! Game Repository trait

use async_trait::async_trait;
use shiroha_common::{Pagination, total_pages};
use shiroha_errors::AppResult;

use super::game::{Game, GameId};

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// 新增游戏
    async fn create(&self, game: &Game) -> AppResult<()>;

    /// 删除游戏，不存在时返回 NotFound
    async fn delete(&self, id: &GameId) -> AppResult<()>;

    /// 覆盖更新所有字段，不存在时返回 NotFound
    async fn update(&self, game: &Game) -> AppResult<()>;

    /// 根据 ID 查找
    async fn find_by_id(&self, id: &GameId) -> AppResult<Option<Game>>;

    /// 查询全部
    async fn list_all(&self) -> AppResult<Vec<Game>>;

    /// 总数
    async fn count(&self) -> AppResult<u64>;

    /// 分页查询，按 game_id 排序
    async fn list_page(&self, pagination: &Pagination) -> AppResult<Vec<Game>>;

    /// 总页数
    async fn count_pages(&self, page_size: u32) -> AppResult<u64> {
        Ok(total_pages(self.count().await?, page_size))
    }
}
