//! 认证流程错误
//!
//! 认证接口对外的状态码和信息是固定文案，不走 `AppError` 的通用映射

use axum::response::{IntoResponse, Response};
use shiroha_errors::{ApiResponse, AppError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid json")]
    InvalidJson,

    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid captcha")]
    InvalidCaptcha,

    #[error("invalid user id")]
    InvalidUserId,

    #[error("unauthorized")]
    Unauthorized,

    #[error("The mailbox is not verified")]
    EmailNotVerified,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("unable to send email")]
    EmailDelivery(#[source] AppError),

    #[error("internal server error")]
    Internal(#[source] AppError),

    #[error(transparent)]
    Provider(#[from] AppError),
}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidJson
            | Self::InvalidEmail
            | Self::InvalidPassword
            | Self::InvalidCaptcha
            | Self::InvalidUserId => 422,
            Self::Unauthorized => 401,
            Self::EmailNotVerified => 400,
            Self::UserAlreadyExists => 409,
            Self::EmailDelivery(_) | Self::Internal(_) => 500,
            Self::Provider(e) => e.status_code(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Provider(e) => e.into_response(),
            Self::EmailDelivery(ref source) | Self::Internal(ref source) => {
                error!(error = %source, "{}", self);
                ApiResponse::<()>::error(self.status_code(), self.to_string()).into_response()
            }
            other => ApiResponse::<()>::error(other.status_code(), other.to_string()).into_response(),
        }
    }
}
