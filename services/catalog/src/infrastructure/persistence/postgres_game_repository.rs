//! PostgreSQL Game Repository 实现

use async_trait::async_trait;
use chrono::NaiveDate;
use shiroha_common::Pagination;
use shiroha_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Game, GameId, GameRepository};

/// numeric(3,1) 统一以 float8 读出
const SELECT_COLUMNS: &str = r#"
    game_id, title, description, thumbnail_url, release_date, developer,
    rating::float8 AS rating, category_id, is_active, extra_ways
"#;

#[derive(Debug, sqlx::FromRow)]
struct GameRow {
    game_id: Uuid,
    title: String,
    description: Option<String>,
    thumbnail_url: Option<String>,
    release_date: Option<NaiveDate>,
    developer: Option<String>,
    rating: Option<f64>,
    category_id: Option<i32>,
    is_active: bool,
    extra_ways: Option<serde_json::Value>,
}

impl From<GameRow> for Game {
    fn from(row: GameRow) -> Self {
        Self {
            game_id: GameId(row.game_id),
            title: row.title,
            description: row.description,
            thumbnail_url: row.thumbnail_url,
            release_date: row.release_date,
            developer: row.developer,
            rating: row.rating,
            category_id: row.category_id,
            is_active: row.is_active,
            extra_ways: row.extra_ways,
        }
    }
}

pub struct PostgresGameRepository {
    pool: PgPool,
}

impl PostgresGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameRepository for PostgresGameRepository {
    async fn create(&self, game: &Game) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO games (game_id, title, description, thumbnail_url, release_date,
                               developer, rating, category_id, is_active, extra_ways)
            VALUES ($1, $2, $3, $4, $5, $6, $7::numeric, $8, $9, $10)
            "#,
        )
        .bind(game.game_id.0)
        .bind(&game.title)
        .bind(&game.description)
        .bind(&game.thumbnail_url)
        .bind(game.release_date)
        .bind(&game.developer)
        .bind(game.rating)
        .bind(game.category_id)
        .bind(game.is_active)
        .bind(&game.extra_ways)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict(format!("Game {} already exists", game.game_id))
            }
            e => AppError::database(format!("Failed to create game: {}", e)),
        })?;

        Ok(())
    }

    async fn delete(&self, id: &GameId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM games WHERE game_id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete game: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Game {} not found", id)));
        }
        Ok(())
    }

    async fn update(&self, game: &Game) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE games
            SET title = $2, description = $3, thumbnail_url = $4, release_date = $5,
                developer = $6, rating = $7::numeric, category_id = $8, is_active = $9,
                extra_ways = $10
            WHERE game_id = $1
            "#,
        )
        .bind(game.game_id.0)
        .bind(&game.title)
        .bind(&game.description)
        .bind(&game.thumbnail_url)
        .bind(game.release_date)
        .bind(&game.developer)
        .bind(game.rating)
        .bind(game.category_id)
        .bind(game.is_active)
        .bind(&game.extra_ways)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update game: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Game {} not found", game.game_id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &GameId) -> AppResult<Option<Game>> {
        let sql = format!("SELECT {} FROM games WHERE game_id = $1", SELECT_COLUMNS);

        let row = sqlx::query_as::<_, GameRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to find game: {}", e)))?;

        Ok(row.map(Game::from))
    }

    async fn list_all(&self) -> AppResult<Vec<Game>> {
        let sql = format!("SELECT {} FROM games ORDER BY game_id", SELECT_COLUMNS);

        let rows = sqlx::query_as::<_, GameRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list games: {}", e)))?;

        Ok(rows.into_iter().map(Game::from).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count games: {}", e)))?;

        Ok(count.max(0) as u64)
    }

    async fn list_page(&self, pagination: &Pagination) -> AppResult<Vec<Game>> {
        let sql = format!(
            "SELECT {} FROM games ORDER BY game_id LIMIT $1 OFFSET $2",
            SELECT_COLUMNS
        );

        let offset = i64::try_from(pagination.offset())
            .map_err(|_| AppError::validation("page is out of range"))?;

        let rows = sqlx::query_as::<_, GameRow>(&sql)
            .bind(i64::from(pagination.limit()))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list games by page: {}", e)))?;

        Ok(rows.into_iter().map(Game::from).collect())
    }
}
