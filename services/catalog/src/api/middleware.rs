//! 中间件

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use shiroha_errors::AppError;
use tracing::{debug, warn};

use super::cookies::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, UID_COOKIE};
use super::state::AppState;

/// 已认证用户的 subject
///
/// 应该在 `authenticate` 之后使用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("unauthorized"))
    }
}

/// Cookie 认证中间件
///
/// 访问令牌有效时注入 [`CurrentUser`]；访问令牌缺失或失效但存在刷新令牌时，
/// 透明刷新会话并在响应中追加新的 Cookie
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()) {
        if !token.is_empty() {
            match state.identity.introspect(&token).await {
                Ok(introspection) if introspection.active => {
                    if let Some(sub) = introspection.sub {
                        request.extensions_mut().insert(CurrentUser(sub));
                    }
                    return next.run(request).await;
                }
                Ok(_) => debug!("Access token is no longer active"),
                Err(e) => {
                    warn!(error = %e, "Token introspection failed");
                    return e.into_response();
                }
            }
        }
    }

    let refresh_token = jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string());
    if refresh_token.as_deref().is_some_and(|t| !t.is_empty()) {
        match state.auth.refresh(refresh_token.as_deref()).await {
            Ok(tokens) => {
                match state.identity.introspect(&tokens.access_token).await {
                    Ok(introspection) if introspection.active => {
                        if let Some(sub) = introspection.sub {
                            request.extensions_mut().insert(CurrentUser(sub));
                        }
                    }
                    Ok(_) => {
                        warn!("Refreshed access token is not active");
                        return AppError::unauthorized("unauthorized").into_response();
                    }
                    Err(e) => return e.into_response(),
                }

                debug!("Session refreshed transparently");
                let uid = jar.get(UID_COOKIE).map(|c| c.value().to_string());
                let jar = state.cookies.issue(jar, &tokens, uid.as_deref());
                let response = next.run(request).await;
                return (jar, response).into_response();
            }
            Err(e) => debug!(error = %e, "Transparent refresh failed"),
        }
    }

    AppError::unauthorized("unauthorized").into_response()
}
