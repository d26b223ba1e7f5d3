//! Game 实体

use chrono::NaiveDate;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use shiroha_errors::{AppError, AppResult};
use uuid::Uuid;

/// 标题最大长度（varchar(255)）
pub const MAX_TITLE_LEN: usize = 255;

/// 评分上限
pub const MAX_RATING: f64 = 10.0;

/// 游戏 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub Uuid);

impl GameId {
    pub fn new() -> Self {
        Self(shiroha_common::new_id())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

/// 游戏
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: GameId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,
    /// 始终序列化，false 也会输出
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    /// 额外游玩方式（平台、下载链接等）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_ways: Option<serde_json::Value>,
}

fn default_is_active() -> bool {
    true
}

impl Game {
    /// 创建只有标题的游戏
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            game_id: GameId::new(),
            title: title.into(),
            description: None,
            thumbnail_url: None,
            release_date: None,
            developer: None,
            rating: None,
            category_id: None,
            is_active: true,
            extra_ways: None,
        }
    }

    /// 写入前校验
    pub fn validate(&self) -> AppResult<()> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("title must not be empty"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(AppError::validation(format!(
                "title must not exceed {} characters",
                MAX_TITLE_LEN
            )));
        }
        if let Some(rating) = self.rating {
            if !(0.0..=MAX_RATING).contains(&rating) {
                return Err(AppError::validation(format!(
                    "rating must be between 0 and {}",
                    MAX_RATING
                )));
            }
        }
        Ok(())
    }
}

/// 创建或更新游戏的请求体
///
/// 创建时 `game_id` 缺省则自动生成；更新时以路径中的 ID 为准
#[derive(Debug, Clone, Deserialize)]
pub struct GameInput {
    #[serde(default)]
    pub game_id: Option<GameId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub extra_ways: Option<serde_json::Value>,
}

impl GameInput {
    pub fn into_game(self, id: Option<GameId>) -> Game {
        Game {
            game_id: id.or(self.game_id).unwrap_or_default(),
            title: self.title,
            description: self.description,
            thumbnail_url: self.thumbnail_url,
            release_date: self.release_date,
            developer: self.developer,
            rating: self.rating,
            category_id: self.category_id,
            is_active: self.is_active,
            extra_ways: self.extra_ways,
        }
    }
}
