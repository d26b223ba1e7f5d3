//! 认证服务
//!
//! 登录、注册、邮箱验证、登出和刷新都委托给身份提供方，
//! 这里只负责流程编排和错误归类

use serde_json::json;
use shiroha_adapter_email::EmailSender;
use shiroha_errors::AppError;
use shiroha_ports::{IdentityProvider, NewIdentityUser, TokenSet};
use std::sync::Arc;
use tracing::{info, warn};

use super::challenge_service::ChallengeService;
use crate::domain::ChallengeAnswer;
use crate::error::AuthError;
use crate::infrastructure::observability::{
    record_login_attempt, record_registration, record_session_refresh,
};

/// 头像属性名
pub const AVATAR_ATTRIBUTE: &str = "avatar";

/// 认证流程配置
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// 对外访问地址，用于拼接验证链接
    pub public_base_url: String,
    pub verification_template: String,
    pub verification_subject: String,
    /// 新用户默认加入的群组
    pub default_group_id: Option<String>,
}

/// 登录结果
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenSet,
    pub user_id: String,
    pub avatar: String,
}

/// 注册请求
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
    pub captcha_id: String,
    pub captcha_value: ChallengeAnswer,
}

pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    email: Arc<dyn EmailSender>,
    challenges: Arc<ChallengeService>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        email: Arc<dyn EmailSender>,
        challenges: Arc<ChallengeService>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            identity,
            email,
            challenges,
            settings,
        }
    }

    /// 邮箱验证链接
    pub fn verify_url(&self, uid: &str) -> String {
        format!(
            "{}/auth/verify?uid={}",
            self.settings.public_base_url.trim_end_matches('/'),
            uid
        )
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let (tokens, user_info) = match self.identity.login(email, password).await {
            Ok(result) => result,
            Err(e) => {
                record_login_attempt(false);
                return Err(match e {
                    AppError::Unauthenticated(_) | AppError::Unauthorized(_) => {
                        AuthError::Unauthorized
                    }
                    AppError::FailedPrecondition(_) => AuthError::EmailNotVerified,
                    other => AuthError::Internal(other),
                });
            }
        };

        let user = self
            .identity
            .get_user(&user_info.sub)
            .await
            .map_err(AuthError::Internal)?;
        let avatar = user
            .first_attribute(AVATAR_ATTRIBUTE)
            .unwrap_or_default()
            .to_string();

        record_login_attempt(true);
        info!(user_id = %user_info.sub, "User logged in");

        Ok(LoginOutcome {
            tokens,
            user_id: user_info.sub,
            avatar,
        })
    }

    /// 注册新用户，返回用户 ID
    ///
    /// 验证码校验失败时直接返回，不会创建用户
    pub async fn register(&self, command: RegisterCommand) -> Result<String, AuthError> {
        let result = self.register_inner(command).await;
        record_registration(result.is_ok());
        result
    }

    async fn register_inner(&self, command: RegisterCommand) -> Result<String, AuthError> {
        let email = command.email.trim();
        if !email_address::EmailAddress::is_valid(email) {
            return Err(AuthError::InvalidEmail);
        }
        if command.password.is_empty() {
            return Err(AuthError::InvalidPassword);
        }

        if !self
            .challenges
            .verify(&command.captcha_id, &command.captcha_value)
            .await?
        {
            return Err(AuthError::InvalidCaptcha);
        }

        let new_user = NewIdentityUser {
            email: email.to_string(),
            password: command.password,
        };
        let user_id = self
            .identity
            .create_user(&new_user)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Provider(other),
            })?;

        if let Some(group_id) = &self.settings.default_group_id {
            self.identity.add_user_to_group(&user_id, group_id).await?;
        }

        let context = json!({
            "uid": user_id,
            "email": email,
            "verify_url": self.verify_url(&user_id),
        });
        self.email
            .send_template_email(
                email,
                &self.settings.verification_subject,
                &self.settings.verification_template,
                &context,
            )
            .await
            .map_err(AuthError::EmailDelivery)?;

        info!(user_id = %user_id, "User registered");
        Ok(user_id)
    }

    pub async fn verify_email(&self, uid: &str) -> Result<(), AuthError> {
        let uid = uid.trim();
        if uid.is_empty() {
            return Err(AuthError::InvalidUserId);
        }

        self.identity.mark_email_verified(uid).await?;
        info!(user_id = %uid, "Email verified");
        Ok(())
    }

    /// 结束会话，身份提供方报错只记录日志
    pub async fn logout(&self, refresh_token: Option<&str>) {
        let Some(token) = refresh_token.filter(|t| !t.is_empty()) else {
            return;
        };

        if let Err(e) = self.identity.logout(token).await {
            warn!(error = %e, "Failed to end identity session");
        }
    }

    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenSet, AuthError> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthorized)?;

        let result = self.identity.refresh(token).await.map_err(|e| match e {
            AppError::Unauthenticated(_)
            | AppError::Unauthorized(_)
            | AppError::FailedPrecondition(_) => AuthError::Unauthorized,
            other => AuthError::Provider(other),
        });

        record_session_refresh(result.is_ok());
        result
    }
}
