//! 身份提供方 trait 定义

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shiroha_errors::AppResult;
use std::collections::HashMap;

/// OAuth2 令牌集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// 访问令牌有效期（秒）
    pub expires_in: i64,
    /// 刷新令牌有效期（秒）
    pub refresh_expires_in: i64,
    pub session_state: Option<String>,
    pub token_type: String,
}

/// OIDC userinfo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub preferred_username: Option<String>,
}

/// 身份提供方中的用户
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub enabled: bool,
    pub attributes: HashMap<String, Vec<String>>,
}

impl IdentityUser {
    /// 读取属性的第一个值
    pub fn first_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// 注册用户时的输入
#[derive(Debug, Clone)]
pub struct NewIdentityUser {
    pub email: String,
    pub password: String,
}

impl NewIdentityUser {
    /// 身份提供方中的用户名
    pub fn username(&self) -> String {
        format!("user@{}", self.email)
    }
}

/// 令牌内省结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIntrospection {
    pub active: bool,
    pub sub: Option<String>,
}

/// 身份提供方 trait
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 使用邮箱和密码登录，返回令牌和用户信息
    async fn login(&self, email: &str, password: &str) -> AppResult<(TokenSet, UserInfo)>;

    /// 创建用户，返回用户 ID
    async fn create_user(&self, user: &NewIdentityUser) -> AppResult<String>;

    /// 获取用户详情
    async fn get_user(&self, user_id: &str) -> AppResult<IdentityUser>;

    /// 标记邮箱已验证
    async fn mark_email_verified(&self, user_id: &str) -> AppResult<()>;

    /// 结束会话
    async fn logout(&self, refresh_token: &str) -> AppResult<()>;

    /// 刷新访问令牌
    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenSet>;

    /// 检查用户是否拥有 realm 角色
    async fn has_realm_role(&self, user_id: &str, role: &str) -> AppResult<bool>;

    /// 将用户加入群组
    async fn add_user_to_group(&self, user_id: &str, group_id: &str) -> AppResult<()>;

    /// 内省访问令牌
    async fn introspect(&self, access_token: &str) -> AppResult<TokenIntrospection>;
}
