//! shiroha-config - 配置加载库
//!
//! 加载顺序：`default.toml` → `<APP_ENV>.toml` → `SHIROHA_` 前缀环境变量

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use thiserror::Error;

use secrecy::Secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

/// Redis 配置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Secret<String>,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 对外访问地址，用于拼接邮件中的验证链接
    pub public_base_url: String,
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OAuth2 客户端凭据
#[derive(Debug, Clone, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
}

/// Keycloak 配置
#[derive(Debug, Clone, Deserialize)]
pub struct KeycloakConfig {
    pub base_url: String,
    /// 管理客户端所在的 realm
    pub admin_realm: String,
    /// 终端用户所在的 realm
    pub client_realm: String,
    pub admin: ClientCredentials,
    pub client: ClientCredentials,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// 注册后自动加入的群组
    pub default_group_id: Option<String>,
    /// 写操作所需的 realm 角色
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_admin_role() -> String {
    "admin".to_string()
}

/// 邮件发送方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTransport {
    /// 第三方模板邮件 HTTP 接口
    #[default]
    MailApi,
    /// SMTP + 本地模板
    Smtp,
}

/// 邮件 HTTP 接口配置
#[derive(Debug, Clone, Deserialize)]
pub struct MailApiConfig {
    pub request_url: String,
    pub app_key: Secret<String>,
}

/// SMTP 配置
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub template_dir: String,
}

fn default_timeout_secs() -> u64 {
    30
}

/// 邮件配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub transport: EmailTransport,
    /// 验证邮件模板（HTTP 接口为模板 ID，SMTP 为模板文件名）
    pub verification_template: String,
    #[serde(default = "default_verification_subject")]
    pub verification_subject: String,
    pub mail_api: Option<MailApiConfig>,
    pub smtp: Option<SmtpConfig>,
}

fn default_verification_subject() -> String {
    "Verify your email address".to_string()
}

/// 列表缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_page_ttl_secs")]
    pub page_ttl_secs: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_ttl_secs: default_page_ttl_secs(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_ttl_secs() -> u64 {
    3600
}

fn default_max_page_size() -> u32 {
    100
}

/// 验证码配置
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeConfig {
    #[serde(default = "default_challenge_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_captcha_length")]
    pub captcha_length: usize,
    #[serde(default = "default_qr_length")]
    pub qr_length: usize,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_challenge_ttl_secs(),
            captcha_length: default_captcha_length(),
            qr_length: default_qr_length(),
        }
    }
}

fn default_challenge_ttl_secs() -> u64 {
    300
}

fn default_captcha_length() -> usize {
    6
}

fn default_qr_length() -> usize {
    4
}

/// 会话 Cookie 配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_domain: String,
    #[serde(default)]
    pub secure: bool,
    /// 邮箱验证成功后的跳转地址
    pub verified_redirect_url: String,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub telemetry: TelemetryConfig,
    pub keycloak: KeycloakConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub challenge: ChallengeConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("SHIROHA_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

/// 配置目录：`$ROOT/configs`，未设置 ROOT 时为当前目录下的 `configs`
pub fn config_dir() -> PathBuf {
    let root = std::env::var("ROOT").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(root).join("configs")
}
