//! 验证码接口

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use shiroha_errors::ApiResponse;
use tracing::error;

use super::state::AppState;

/// 二维码验证码 ID 响应头
pub const CAPTCHA_ID_HEADER: &str = "X-Captcha-Id";

pub fn misc_routes() -> Router<AppState> {
    Router::new()
        .route("/misc/static/captcha", get(captcha))
        .route("/misc/static/qrcode", get(qrcode))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaResponse {
    pub code: u16,
    pub data: String,
    pub captcha_id: String,
    pub msg: &'static str,
}

fn server_error() -> Response {
    ApiResponse::<()>::error(500, "server error").into_response()
}

async fn captcha(State(state): State<AppState>) -> Response {
    match state.challenges.issue_captcha().await {
        Ok((challenge, image)) => Json(CaptchaResponse {
            code: 200,
            data: image,
            captcha_id: challenge.id,
            msg: "success",
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to issue captcha");
            server_error()
        }
    }
}

async fn qrcode(State(state): State<AppState>) -> Response {
    match state.challenges.issue_qr().await {
        Ok((challenge, svg)) => (
            [
                (CONTENT_TYPE.as_str(), "image/svg+xml".to_string()),
                (CAPTCHA_ID_HEADER, challenge.id),
            ],
            svg,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to issue QR code");
            server_error()
        }
    }
}
