//! 游戏服务

use shiroha_common::Pagination;
use shiroha_errors::AppResult;
use std::sync::Arc;
use tracing::info;

use crate::domain::{Game, GameId, GameRepository};

/// 游戏服务，写入前做校验，其余直接委托给仓储
pub struct GameService {
    repo: Arc<dyn GameRepository>,
}

impl GameService {
    pub fn new(repo: Arc<dyn GameRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, game: &Game) -> AppResult<()> {
        game.validate()?;
        self.repo.create(game).await?;
        info!(game_id = %game.game_id, title = %game.title, "Game created");
        Ok(())
    }

    pub async fn delete(&self, id: &GameId) -> AppResult<()> {
        self.repo.delete(id).await?;
        info!(game_id = %id, "Game deleted");
        Ok(())
    }

    pub async fn update(&self, game: &Game) -> AppResult<()> {
        game.validate()?;
        self.repo.update(game).await?;
        info!(game_id = %game.game_id, "Game updated");
        Ok(())
    }

    pub async fn find_by_id(&self, id: &GameId) -> AppResult<Option<Game>> {
        self.repo.find_by_id(id).await
    }

    pub async fn list_all(&self) -> AppResult<Vec<Game>> {
        self.repo.list_all().await
    }

    pub async fn count(&self) -> AppResult<u64> {
        self.repo.count().await
    }

    pub async fn list_page(&self, pagination: &Pagination) -> AppResult<Vec<Game>> {
        self.repo.list_page(pagination).await
    }

    pub async fn count_pages(&self, page_size: u32) -> AppResult<u64> {
        self.repo.count_pages(page_size).await
    }
}
