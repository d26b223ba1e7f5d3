//! 游戏接口

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use shiroha_common::Pagination;
use shiroha_errors::{ApiResponse, AppError, AppResult};
use tracing::debug;
use uuid::Uuid;

use super::middleware::CurrentUser;
use super::state::AppState;
use crate::application::GamePage;
use crate::domain::{Game, GameId, GameInput};

pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
}

/// 查询参数按字符串接收，非整数时返回固定文案
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<GamePage>> {
    let pagination = Pagination::parse(
        query.page.as_deref(),
        query.page_size.as_deref(),
        state.max_page_size,
    )?;
    debug!(page = pagination.page, page_size = pagination.page_size, "Listing games");

    let page = state.listing.list(&pagination).await?;
    Ok(Json(page))
}

fn parse_game_id(raw: &str) -> AppResult<GameId> {
    Uuid::parse_str(raw)
        .map(GameId)
        .map_err(|_| AppError::validation("invalid game id"))
}

async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Game>> {
    let id = parse_game_id(&id)?;
    let game = state
        .games
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Game {} not found", id)))?;
    Ok(ApiResponse::success(Some(game)))
}

/// 写接口需要管理员 realm 角色
async fn require_admin(state: &AppState, user: &CurrentUser) -> AppResult<()> {
    if state.identity.has_realm_role(&user.0, &state.admin_role).await? {
        Ok(())
    } else {
        Err(AppError::forbidden("admin role required"))
    }
}

fn game_input(body: Result<Json<GameInput>, JsonRejection>) -> AppResult<GameInput> {
    body.map(|Json(input)| input)
        .map_err(|_| AppError::unprocessable("invalid json"))
}

async fn create_game(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<GameInput>, JsonRejection>,
) -> AppResult<ApiResponse<Game>> {
    require_admin(&state, &user).await?;
    let game = game_input(body)?.into_game(None);

    state.games.create(&game).await?;
    Ok(ApiResponse::success(Some(game)))
}

async fn update_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<GameInput>, JsonRejection>,
) -> AppResult<ApiResponse<Game>> {
    require_admin(&state, &user).await?;
    let id = parse_game_id(&id)?;
    let game = game_input(body)?.into_game(Some(id));

    state.games.update(&game).await?;
    Ok(ApiResponse::success(Some(game)))
}

async fn delete_game(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&state, &user).await?;
    let id = parse_game_id(&id)?;

    state.games.delete(&id).await?;
    Ok(ApiResponse::success(None))
}
