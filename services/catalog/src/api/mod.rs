//! HTTP 接口层

pub mod auth;
pub mod cookies;
pub mod games;
pub mod health;
pub mod middleware;
pub mod misc;
pub mod state;

pub use cookies::SessionCookies;
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// 构建路由，`/games` 下的接口需要登录
pub fn router(state: AppState) -> Router {
    let protected = games::game_routes().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::authenticate,
    ));

    Router::new()
        .merge(protected)
        .merge(auth::auth_routes())
        .merge(misc::misc_routes())
        .merge(health::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
