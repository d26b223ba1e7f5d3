//! 认证路由

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use shiroha_errors::ApiResponse;

use super::cookies::{REFRESH_TOKEN_COOKIE, UID_COOKIE};
use super::state::AppState;
use crate::application::RegisterCommand;
use crate::domain::ChallengeAnswer;
use crate::error::AuthError;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/verify", get(verify))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub avatar: String,
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), AuthError> {
    let Json(request) = body.map_err(|_| AuthError::InvalidJson)?;

    let outcome = state.auth.login(&request.email, &request.password).await?;
    let jar = state
        .cookies
        .issue(jar, &outcome.tokens, Some(&outcome.user_id));

    Ok((
        jar,
        ApiResponse::success(Some(LoginResponse {
            avatar: outcome.avatar,
        })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub captcha_id: String,
    pub captcha_value: ChallengeAnswer,
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AuthError> {
    let Json(request) = body.map_err(|_| AuthError::InvalidJson)?;

    let command = RegisterCommand {
        email: request.email,
        password: request.password,
        captcha_id: request.captcha_id,
        captcha_value: request.captcha_value,
    };
    state.auth.register(command).await?;

    Ok(ApiResponse::success(None))
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub uid: String,
}

async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Redirect, AuthError> {
    state.auth.verify_email(&query.uid).await?;
    Ok(Redirect::to(&state.verified_redirect_url))
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let refresh_token = jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string());
    state.auth.logout(refresh_token.as_deref()).await;

    let jar = state.cookies.clear(jar);
    (jar, ApiResponse::<()>::success(None)).into_response()
}

async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<()>), AuthError> {
    let refresh_token = jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string());
    let tokens = state.auth.refresh(refresh_token.as_deref()).await?;

    let uid = jar.get(UID_COOKIE).map(|c| c.value().to_string());
    let jar = state.cookies.issue(jar, &tokens, uid.as_deref());
    Ok((jar, ApiResponse::success(None)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_accepts_numeric_captcha() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "a@example.com",
            "password": "pw",
            "captchaId": "id",
            "captchaValue": 42
        }))
        .unwrap();
        assert_eq!(request.captcha_value, ChallengeAnswer::Number(42));
        assert!(request.captcha_value.matches("000042"));
    }
}
