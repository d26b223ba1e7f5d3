//! 路由测试公共组件
//!
//! 所有外部依赖都替换为内存实现

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::Value;
use shiroha_adapter_email::EmailSender;
use shiroha_catalog::api::{self, AppState, SessionCookies};
use shiroha_catalog::application::{
    AuthService, AuthSettings, ChallengeService, GameListing, GameService, PageCache,
};
use shiroha_catalog::domain::{ChallengeRenderer, Game, GameId, GameRepository};
use shiroha_catalog::infrastructure::health::ReadinessProbe;
use shiroha_catalog::infrastructure::render::SvgChallengeRenderer;
use shiroha_common::{ComponentHealth, HealthReport, Pagination};
use shiroha_config::ChallengeConfig;
use shiroha_errors::{AppError, AppResult};
use shiroha_ports::{
    CachePort, HashCachePort, IdentityProvider, IdentityUser, NewIdentityUser, TokenIntrospection,
    TokenSet, UserInfo,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const ADMIN_ROLE: &str = "catalog-admin";
pub const REDIRECT_URL: &str = "https://shiroha.example.com/verified";

// ============================================================================
// 仓储
// ============================================================================

#[derive(Default)]
pub struct MemoryGameRepository {
    games: Mutex<BTreeMap<GameId, Game>>,
    pub list_page_calls: AtomicUsize,
    pub fail_count: AtomicBool,
}

impl MemoryGameRepository {
    pub fn insert(&self, game: Game) {
        self.games.lock().unwrap().insert(game.game_id, game);
    }

    pub fn get(&self, id: &GameId) -> Option<Game> {
        self.games.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl GameRepository for MemoryGameRepository {
    async fn create(&self, game: &Game) -> AppResult<()> {
        let mut games = self.games.lock().unwrap();
        if games.contains_key(&game.game_id) {
            return Err(AppError::conflict("game already exists"));
        }
        games.insert(game.game_id, game.clone());
        Ok(())
    }

    async fn delete(&self, id: &GameId) -> AppResult<()> {
        self.games
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Game {} not found", id)))
    }

    async fn update(&self, game: &Game) -> AppResult<()> {
        let mut games = self.games.lock().unwrap();
        match games.get_mut(&game.game_id) {
            Some(existing) => {
                *existing = game.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!("Game {} not found", game.game_id))),
        }
    }

    async fn find_by_id(&self, id: &GameId) -> AppResult<Option<Game>> {
        Ok(self.get(id))
    }

    async fn list_all(&self) -> AppResult<Vec<Game>> {
        Ok(self.games.lock().unwrap().values().cloned().collect())
    }

    async fn count(&self) -> AppResult<u64> {
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(AppError::database("connection reset"));
        }
        Ok(self.games.lock().unwrap().len() as u64)
    }

    async fn list_page(&self, pagination: &Pagination) -> AppResult<Vec<Game>> {
        self.list_page_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .games
            .lock()
            .unwrap()
            .values()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .cloned()
            .collect())
    }
}

// ============================================================================
// 缓存
// ============================================================================

#[derive(Default)]
pub struct MemoryCache {
    pub values: Mutex<HashMap<String, String>>,
    pub hashes: Mutex<HashMap<String, HashMap<String, String>>>,
    pub ttls: Mutex<HashMap<String, Duration>>,
}

impl MemoryCache {
    pub fn hash(&self, key: &str) -> Option<HashMap<String, String>> {
        self.hashes.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl CachePort for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        if let Some(ttl) = ttl {
            self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.values.lock().unwrap().remove(key);
        self.hashes.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.values.lock().unwrap().contains_key(key)
            || self.hashes.lock().unwrap().contains_key(key))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<()> {
        self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        Ok(())
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.lock().unwrap().remove(key))
    }
}

#[async_trait]
impl HashCachePort for MemoryCache {
    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>> {
        Ok(self.hash(key).unwrap_or_default())
    }

    async fn hash_set_all(&self, key: &str, fields: &[(String, String)]) -> AppResult<()> {
        let mut hashes = self.hashes.lock().unwrap();
        let hash = hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn expire_if_unset(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let mut ttls = self.ttls.lock().unwrap();
        if ttls.contains_key(key) {
            return Ok(false);
        }
        ttls.insert(key.to_string(), ttl);
        Ok(true)
    }
}

// ============================================================================
// 身份提供方
// ============================================================================

#[derive(Debug, Clone)]
struct FakeUser {
    user: IdentityUser,
    password: String,
}

#[derive(Default)]
pub struct FakeIdentity {
    users: Mutex<HashMap<String, FakeUser>>,
    access_tokens: Mutex<HashMap<String, String>>,
    refresh_tokens: Mutex<HashMap<String, String>>,
    roles: Mutex<HashMap<String, HashSet<String>>>,
    pub groups: Mutex<Vec<(String, String)>>,
    pub logged_out: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl FakeIdentity {
    /// 添加用户，返回用户 ID
    pub fn add_user(&self, email: &str, password: &str, verified: bool) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let user = IdentityUser {
            id: id.clone(),
            username: Some(format!("user@{}", email)),
            email: Some(email.to_string()),
            email_verified: verified,
            enabled: true,
            attributes: HashMap::new(),
        };
        self.users.lock().unwrap().insert(
            id.clone(),
            FakeUser {
                user,
                password: password.to_string(),
            },
        );
        id
    }

    pub fn set_attribute(&self, user_id: &str, name: &str, value: &str) {
        if let Some(user) = self.users.lock().unwrap().get_mut(user_id) {
            user.user
                .attributes
                .insert(name.to_string(), vec![value.to_string()]);
        }
    }

    pub fn grant_role(&self, user_id: &str, role: &str) {
        self.roles
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .insert(role.to_string());
    }

    pub fn user(&self, user_id: &str) -> Option<IdentityUser> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .map(|u| u.user.clone())
    }

    pub fn find_by_email(&self, email: &str) -> Option<IdentityUser> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.user.email.as_deref() == Some(email))
            .map(|u| u.user.clone())
    }

    /// 直接签发一组令牌
    pub fn issue_tokens(&self, user_id: &str) -> TokenSet {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let tokens = TokenSet {
            access_token: format!("access-{}", n),
            refresh_token: format!("refresh-{}", n),
            expires_in: 300,
            refresh_expires_in: 1800,
            session_state: Some(format!("state-{}", n)),
            token_type: "Bearer".to_string(),
        };
        self.access_tokens
            .lock()
            .unwrap()
            .insert(tokens.access_token.clone(), user_id.to_string());
        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(tokens.refresh_token.clone(), user_id.to_string());
        tokens
    }

    pub fn revoke_access(&self, access_token: &str) {
        self.access_tokens.lock().unwrap().remove(access_token);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn login(&self, email: &str, password: &str) -> AppResult<(TokenSet, UserInfo)> {
        let user = self
            .find_by_email(email)
            .ok_or_else(|| AppError::unauthenticated("invalid_grant"))?;
        let stored = self.users.lock().unwrap()[&user.id].password.clone();
        if stored != password {
            return Err(AppError::unauthenticated("invalid_grant"));
        }
        if !user.email_verified {
            return Err(AppError::failed_precondition("Account is not fully set up"));
        }

        let tokens = self.issue_tokens(&user.id);
        let info = UserInfo {
            sub: user.id.clone(),
            email: user.email.clone(),
            email_verified: Some(true),
            preferred_username: user.username.clone(),
        };
        Ok((tokens, info))
    }

    async fn create_user(&self, user: &NewIdentityUser) -> AppResult<String> {
        if self.find_by_email(&user.email).is_some() {
            return Err(AppError::conflict("User exists with same username"));
        }
        Ok(self.add_user(&user.email, &user.password, false))
    }

    async fn get_user(&self, user_id: &str) -> AppResult<IdentityUser> {
        self.user(user_id)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn mark_email_verified(&self, user_id: &str) -> AppResult<()> {
        match self.users.lock().unwrap().get_mut(user_id) {
            Some(user) => {
                user.user.email_verified = true;
                Ok(())
            }
            None => Err(AppError::not_found("User not found")),
        }
    }

    async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        self.refresh_tokens.lock().unwrap().remove(refresh_token);
        self.logged_out
            .lock()
            .unwrap()
            .push(refresh_token.to_string());
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenSet> {
        let user_id = self
            .refresh_tokens
            .lock()
            .unwrap()
            .remove(refresh_token)
            .ok_or_else(|| AppError::failed_precondition("invalid_grant"))?;
        Ok(self.issue_tokens(&user_id))
    }

    async fn has_realm_role(&self, user_id: &str, role: &str) -> AppResult<bool> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .get(user_id)
            .is_some_and(|roles| roles.contains(role)))
    }

    async fn add_user_to_group(&self, user_id: &str, group_id: &str) -> AppResult<()> {
        self.groups
            .lock()
            .unwrap()
            .push((user_id.to_string(), group_id.to_string()));
        Ok(())
    }

    async fn introspect(&self, access_token: &str) -> AppResult<TokenIntrospection> {
        let sub = self.access_tokens.lock().unwrap().get(access_token).cloned();
        Ok(TokenIntrospection {
            active: sub.is_some(),
            sub,
        })
    }
}

// ============================================================================
// 邮件
// ============================================================================

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub context: Value,
}

#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<SentEmail>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_template_email(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        context: &Value,
    ) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::external_service("mail api returned 500"));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            template: template.to_string(),
            context: context.clone(),
        });
        Ok(())
    }
}

// ============================================================================
// 就绪检查
// ============================================================================

pub struct StaticReadiness(pub bool);

#[async_trait]
impl ReadinessProbe for StaticReadiness {
    async fn check(&self) -> HealthReport {
        let check = if self.0 {
            ComponentHealth::healthy("postgres", 1)
        } else {
            ComponentHealth::unhealthy("postgres", "connection refused")
        };
        HealthReport::new(vec![check])
    }
}

// ============================================================================
// 测试应用
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryGameRepository>,
    pub cache: Arc<MemoryCache>,
    pub identity: Arc<FakeIdentity>,
    pub email: Arc<RecordingEmailSender>,
}

pub struct TestAppBuilder {
    renderer: Arc<dyn ChallengeRenderer>,
    default_group_id: Option<String>,
    ready: bool,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            renderer: Arc::new(SvgChallengeRenderer::default()),
            default_group_id: None,
            ready: true,
        }
    }
}

impl TestAppBuilder {
    pub fn renderer(mut self, renderer: Arc<dyn ChallengeRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn default_group(mut self, group_id: &str) -> Self {
        self.default_group_id = Some(group_id.to_string());
        self
    }

    pub fn ready(mut self, ready: bool) -> Self {
        self.ready = ready;
        self
    }

    pub fn build(self) -> TestApp {
        let repo = Arc::new(MemoryGameRepository::default());
        let cache = Arc::new(MemoryCache::default());
        let identity = Arc::new(FakeIdentity::default());
        let email = Arc::new(RecordingEmailSender::default());

        let games = Arc::new(GameService::new(repo.clone()));
        let listing = Arc::new(GameListing::new(
            games.clone(),
            PageCache::new(cache.clone(), Duration::from_secs(3600)),
        ));
        let challenges = Arc::new(ChallengeService::new(
            cache.clone(),
            self.renderer,
            ChallengeConfig::default(),
        ));
        let auth = Arc::new(AuthService::new(
            identity.clone(),
            email.clone(),
            challenges.clone(),
            AuthSettings {
                public_base_url: "https://api.shiroha.example.com/".to_string(),
                verification_template: "email_verification".to_string(),
                verification_subject: "Verify your email address".to_string(),
                default_group_id: self.default_group_id,
            },
        ));

        let state = AppState {
            games,
            listing,
            challenges,
            auth,
            identity: identity.clone(),
            readiness: Arc::new(StaticReadiness(self.ready)),
            metrics: PrometheusBuilder::new().build_recorder().handle(),
            cookies: SessionCookies::new("shiroha.example.com", false),
            max_page_size: 100,
            admin_role: ADMIN_ROLE.to_string(),
            verified_redirect_url: REDIRECT_URL.to_string(),
        };

        TestApp {
            router: api::router(state),
            repo,
            cache,
            identity,
            email,
        }
    }
}

impl TestApp {
    pub fn new() -> Self {
        TestAppBuilder::default().build()
    }

    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// 为用户签发令牌并返回 Cookie 头
    pub fn session_cookie(&self, user_id: &str) -> String {
        let tokens = self.identity.issue_tokens(user_id);
        format!(
            "csrf_token={}; refresh_token={}; uid={}",
            tokens.access_token, tokens.refresh_token, user_id
        )
    }

    /// 创建已验证邮箱的普通用户并返回 Cookie 头
    pub fn signed_in_user(&self) -> (String, String) {
        let user_id = self.identity.add_user("player@example.com", "secret", true);
        let cookie = self.session_cookie(&user_id);
        (user_id, cookie)
    }

    /// 创建管理员并返回 Cookie 头
    pub fn signed_in_admin(&self) -> (String, String) {
        let user_id = self.identity.add_user("admin@example.com", "secret", true);
        self.identity.grant_role(&user_id, ADMIN_ROLE);
        let cookie = self.session_cookie(&user_id);
        (user_id, cookie)
    }
}

// ============================================================================
// 请求与响应工具
// ============================================================================

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn send_json(method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    send_raw(method, uri, body.to_string(), cookie)
}

pub fn send_raw(method: &str, uri: &str, body: String, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn empty(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// 取出响应中所有 Set-Cookie
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// 读取指定 Cookie 的值
pub fn cookie_value(set_cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies.iter().find_map(|c| {
        c.strip_prefix(&prefix)
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
    })
}

/// 在缓存中找到验证码
pub fn stored_challenge(cache: &MemoryCache, id: &str) -> Option<String> {
    cache
        .values
        .lock()
        .unwrap()
        .get(&format!("captcha:{}", id))
        .cloned()
}
